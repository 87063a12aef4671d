use std::path::PathBuf;

pub fn run(data_dir: PathBuf, port: u16) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        let actual_port = listener.local_addr()?.port();
        println!(
            "automaker settings API → http://localhost:{actual_port}  (data: {})",
            data_dir.display()
        );

        tokio::select! {
            res = automaker_server::serve_on(data_dir, listener) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    })
}
