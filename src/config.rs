// src/config.rs
use serde::Serialize;

use crate::structs::LookupError;

pub const SHEET_ID: &str = "1yaDHltfBgrRe2iLASRiokXcTpGQb1Uq2Vo3lQ3dVHlw";
pub const GVIZ_BASE: &str = "https://docs.google.com/spreadsheets/d";
pub const NOTICE_DISMISS_MS: u32 = 3000;
pub const SCANNER_MOUNT_ID: &str = "reader";
pub const SCAN_FPS: u32 = 10;
pub const SCAN_BOX: u32 = 250;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub sheet: SheetSource,
    pub number_format: NumberFormat,
    pub messages: Messages,
    pub notice_dismiss_ms: u32,
    pub scanner: ScannerSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sheet: SheetSource::default(),
            number_format: NumberFormat::pt_br(),
            messages: Messages::pt_br(),
            notice_dismiss_ms: NOTICE_DISMISS_MS,
            scanner: ScannerSettings::default(),
        }
    }
}

/// Published spreadsheet queried through the gviz endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetSource {
    pub sheet_id: String,
    pub gid: Option<u32>, // tab; first tab when unset
}

impl Default for SheetSource {
    fn default() -> Self {
        Self {
            sheet_id: SHEET_ID.to_string(),
            gid: None,
        }
    }
}

impl SheetSource {
    /// URL whose response script calls `handler` with the table payload.
    pub fn request_url(&self, handler: &str) -> String {
        let mut url = format!(
            "{}/{}/gviz/tq?tqx=responseHandler:{}",
            GVIZ_BASE, self.sheet_id, handler
        );
        if let Some(gid) = self.gid {
            url.push_str(&format!("&gid={}", gid));
        }
        url
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumberFormat {
    pub decimal_separator: char,
    pub grouping_separator: char,
    pub currency_prefix: String,
}

impl NumberFormat {
    pub fn pt_br() -> Self {
        Self {
            decimal_separator: ',',
            grouping_separator: '.',
            currency_prefix: "R$".to_string(),
        }
    }

    pub fn en_us() -> Self {
        Self {
            decimal_separator: '.',
            grouping_separator: ',',
            currency_prefix: "$".to_string(),
        }
    }
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::pt_br()
    }
}

/// User facing strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Messages {
    pub loading: String,
    pub not_found: String,
    pub fetch_format: String,
    pub fetch_connection: String,
    pub camera: String,
    pub no_name: String,
    pub code_label: String,
}

impl Messages {
    pub fn pt_br() -> Self {
        Self {
            loading: "Buscando dados atualizados...".to_string(),
            not_found: "Produto não encontrado.".to_string(),
            fetch_format: "Erro ao ler planilha.".to_string(),
            fetch_connection: "Erro de conexão.".to_string(),
            camera: "Erro na câmera.".to_string(),
            no_name: "Sem Nome".to_string(),
            code_label: "EAN: ".to_string(),
        }
    }

    pub fn en_us() -> Self {
        Self {
            loading: "Fetching latest data...".to_string(),
            not_found: "Product not found.".to_string(),
            fetch_format: "Could not read the sheet.".to_string(),
            fetch_connection: "Connection error.".to_string(),
            camera: "Camera error.".to_string(),
            no_name: "No name".to_string(),
            code_label: "EAN: ".to_string(),
        }
    }

    /// `None` for errors that are never shown to the user.
    pub fn for_error(&self, error: LookupError) -> Option<&str> {
        match error {
            LookupError::EmptyQuery => None,
            LookupError::FetchFormat => Some(&self.fetch_format),
            LookupError::FetchConnection => Some(&self.fetch_connection),
            LookupError::NotFound => Some(&self.not_found),
            LookupError::Camera => Some(&self.camera),
        }
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::pt_br()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannerSettings {
    pub mount_id: String,
    pub facing_mode: String,
    pub fps: u32,
    pub qrbox: u32, // square side in pixels
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            mount_id: SCANNER_MOUNT_ID.to_string(),
            facing_mode: "environment".to_string(),
            fps: SCAN_FPS,
            qrbox: SCAN_BOX,
        }
    }
}

#[derive(Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CameraConstraint<'a> {
    pub facing_mode: &'a str,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct QrBox {
    pub width: u32,
    pub height: u32,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct ScanConfig {
    pub fps: u32,
    pub qrbox: QrBox,
}

impl ScannerSettings {
    pub fn camera(&self) -> CameraConstraint<'_> {
        CameraConstraint {
            facing_mode: &self.facing_mode,
        }
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            fps: self.fps,
            qrbox: QrBox {
                width: self.qrbox,
                height: self.qrbox,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url() {
        let source = SheetSource::default();
        assert_eq!(
            source.request_url("cb_1"),
            format!("https://docs.google.com/spreadsheets/d/{}/gviz/tq?tqx=responseHandler:cb_1", SHEET_ID)
        );

        let tab = SheetSource {
            sheet_id: "abc".to_string(),
            gid: Some(42),
        };
        assert_eq!(
            tab.request_url("cb_2"),
            "https://docs.google.com/spreadsheets/d/abc/gviz/tq?tqx=responseHandler:cb_2&gid=42"
        );
    }

    #[test]
    fn test_scanner_objects_serialize_like_the_library_expects() {
        let settings = ScannerSettings::default();
        assert_eq!(
            serde_json::to_value(settings.camera()).unwrap(),
            serde_json::json!({ "facingMode": "environment" })
        );
        assert_eq!(
            serde_json::to_value(settings.scan_config()).unwrap(),
            serde_json::json!({ "fps": 10, "qrbox": { "width": 250, "height": 250 } })
        );
    }

    #[test]
    fn test_empty_query_has_no_message() {
        let messages = Messages::default();
        assert_eq!(messages.for_error(LookupError::EmptyQuery), None);
        assert_eq!(messages.for_error(LookupError::NotFound), Some("Produto não encontrado."));
        assert_eq!(messages.for_error(LookupError::Camera), Some("Erro na câmera."));
    }

    #[test]
    fn test_default_dismiss_delay() {
        assert_eq!(AppConfig::default().notice_dismiss_ms, 3000);
    }
}
