//! selfrun launcher
//!
//! Runs the Lua program glued onto this executable. Every argument is
//! forwarded to the program; nothing is interpreted here.

use selfrun_runtime::{
    fatal, launch, Arguments, LaunchError, LaunchOptions, LuaEngine, NativePlatform, Platform,
};

fn main() {
    selfrun_cli::logging::init();

    let platform = NativePlatform::default();
    let args = Arguments::from_env();
    let program = args.program().unwrap_or("selfrun").to_string();

    let exe = match platform.executable_path() {
        Ok(exe) => exe,
        Err(err) => {
            let err = LaunchError::SelfPathUnresolved(err);
            tracing::debug!(error = ?err, "self path");
            fatal(&platform, &program, &err.to_string())
        }
    };

    let result = LuaEngine::new()
        .and_then(|engine| launch(engine, &exe, &args, LaunchOptions::default()));
    if let Err(err) = result {
        fatal(&platform, &program, &err.to_string());
    }
}
