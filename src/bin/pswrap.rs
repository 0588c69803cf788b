#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() {
    psrunner::init_tracing();
    std::process::exit(psrunner::wrap::wrap(std::env::args_os().skip(1)));
}
