use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::config::AppConfig;
use crate::controller::Controller;
use crate::structs::{Notice, Product, ScannerPhase, Severity};

struct Palette {
    background: &'static str,
    surface: &'static str,
    text: &'static str,
    muted: &'static str,
    border: &'static str,
    primary: &'static str,
    error: &'static str,
    overlay: &'static str,
}

impl Palette {
    const fn light() -> Self {
        Self {
            background: "#f4f6f8",
            surface: "#ffffff",
            text: "#1f2933",
            muted: "#616e7c",
            border: "#d9e2ec",
            primary: "#2563eb",
            error: "#dc2626",
            overlay: "rgba(0, 0, 0, 0.85)",
        }
    }
}

const COLORS: Palette = Palette::light();

#[derive(Properties, PartialEq)]
pub struct AppProps {
    pub config: AppConfig,
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    let query_ref = use_node_ref();
    let redraw = use_force_update();
    let controller = {
        let config = props.config.clone();
        let query_ref = query_ref.clone();
        use_memo((), move |_| Controller::new(config, query_ref, redraw))
    };

    // The camera can only bind once the modal's mount element is rendered.
    {
        let controller = controller.clone();
        use_effect_with(controller.scanner_phase(), move |phase| {
            if *phase == ScannerPhase::Opening {
                controller.start_capture();
            }
            || ()
        });
    }

    {
        let query_ref = query_ref.clone();
        use_effect_with((), move |_| {
            if let Some(input) = query_ref.cast::<HtmlInputElement>() {
                let _ = input.focus();
            }
            || ()
        });
    }

    let onsearch = {
        let controller = controller.clone();
        Callback::from(move |_: MouseEvent| controller.perform_search())
    };
    let onkeydown = {
        let controller = controller.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                controller.perform_search();
            }
        })
    };
    let oncamera = {
        let controller = controller.clone();
        Callback::from(move |_: MouseEvent| controller.open_scanner())
    };
    let onclose = {
        let controller = controller.clone();
        Callback::from(move |_: MouseEvent| controller.close_scanner())
    };

    let backend = controller.backend();
    let regions = backend.regions();
    let config = backend.config();
    let result = regions
        .result
        .map(|product| result_view(product, &config.number_format.currency_prefix))
        .unwrap_or_default();
    let banner = regions.banner.map(banner_view).unwrap_or_default();
    let modal_display = if regions.scanner_modal { "flex" } else { "none" };
    let mount_id = config.scanner.mount_id.clone();

    html! {
        <div style={format!("
            min-height: 100vh;
            display: flex;
            flex-direction: column;
            align-items: center;
            gap: 16px;
            padding: 24px 12px;
            font-family: sans-serif;
            background-color: {};
            color: {};
        ", COLORS.background, COLORS.text)}>
            <section id="searchSection" style={format!("
                width: 100%;
                max-width: 420px;
                display: flex;
                gap: 8px;
                padding: 12px;
                border: 1px solid {};
                border-radius: 8px;
                background-color: {};
            ", COLORS.border, COLORS.surface)}>
                <input
                    id="searchInput"
                    ref={query_ref}
                    type="text"
                    inputmode="numeric"
                    placeholder="EAN"
                    style="flex: 1; padding: 8px; font-size: 18px;"
                    {onkeydown}
                />
                <button id="btnSearch" onclick={onsearch} style={button_style(COLORS.primary)}>{ "Buscar" }</button>
                <button id="btnCamera" onclick={oncamera} style={button_style(COLORS.muted)}>{ "📷" }</button>
            </section>

            { result }
            { banner }

            <div id="scannerModal" style={format!("
                display: {};
                position: fixed;
                inset: 0;
                flex-direction: column;
                align-items: center;
                justify-content: center;
                gap: 12px;
                background-color: {};
            ", modal_display, COLORS.overlay)}>
                <div id={mount_id} style="width: 100%; max-width: 420px;"></div>
                <button id="btnCloseScanner" onclick={onclose} style={button_style(COLORS.error)}>{ "✕" }</button>
            </div>
        </div>
    }
}

fn button_style(background: &str) -> String {
    format!(
        "padding: 8px 14px; border: none; border-radius: 6px; color: #ffffff; background-color: {};",
        background
    )
}

fn result_view(product: &Product, currency_prefix: &str) -> Html {
    html! {
        <section id="resultSection" style={format!("
            width: 100%;
            max-width: 420px;
            padding: 16px;
            border: 1px solid {};
            border-radius: 8px;
            background-color: {};
        ", COLORS.border, COLORS.surface)}>
            <h2 id="productName" style="margin: 0 0 8px 0;">{ product.name.clone() }</h2>
            <p id="productEan" style={format!("margin: 0; color: {};", COLORS.muted)}>{ product.code_line.clone() }</p>
            <p id="productPrice" style={format!("margin: 12px 0 0 0; font-size: 32px; font-weight: bold; color: {};", COLORS.primary)}>
                { format!("{} {}", currency_prefix, product.price) }
            </p>
        </section>
    }
}

fn banner_view(notice: &Notice) -> Html {
    let (background, icon) = match notice.severity {
        Severity::Info => (COLORS.primary, "⟳"),
        Severity::Error => (COLORS.error, "⚠"),
    };
    html! {
        <div id="errorState" style={format!("
            width: 100%;
            max-width: 420px;
            display: flex;
            gap: 8px;
            padding: 10px 14px;
            border-radius: 8px;
            color: #ffffff;
            background-color: {};
        ", background)}>
            <span>{ icon }</span>
            <span id="errorMessage">{ notice.message.clone() }</span>
        </div>
    }
}
