//! Todo Sync Frontend Entry Point

mod app;
mod components;
mod context;
mod logger;
mod poll;
mod store;

use app::App;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    logger::init(log::LevelFilter::Debug);
    mount_to_body(App);
}
