use log::info;
use price_lookup::app::{App, AppProps};
use price_lookup::AppConfig;

pub fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    console_error_panic_hook::set_once(); // to see panics in browser devtools

    let config = AppConfig::default();
    info!("price lookup for sheet {}", config.sheet.sheet_id);
    yew::Renderer::<App>::with_props(AppProps { config }).render();
}
