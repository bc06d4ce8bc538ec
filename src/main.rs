use dubsim::cli::{internal_error, run, user_error, RunFailed};

fn main() {
    let _ = enable_ansi_support::enable_ansi_support();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        // Failed requests are reported like user errors; anything else is internal
        if e.downcast_ref::<RunFailed>().is_some() {
            user_error(&e.to_string());
        }
        internal_error(&format!("{:#}", e));
    }
}
