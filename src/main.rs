use std::process::ExitCode;

fn main() -> ExitCode {
    // Every request is awaited in turn; one thread is enough.
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start async runtime: {err}");
            return ExitCode::FAILURE;
        }
    };
    runtime.block_on(mod_deploy_lib::run())
}
