fn main() {
    resolve_desktop::init_tracing();

    let demo_mode = std::env::args().any(|arg| arg == "--demo");
    #[cfg(feature = "tauri-app")]
    if !demo_mode {
        resolve_desktop::run_tauri();
        return;
    }

    let result = if demo_mode {
        resolve_desktop::run_demo()
    } else {
        resolve_desktop::run()
    };

    if let Err(err) = result {
        eprintln!("failed to start resolve desktop host: {err}");
    }
}
