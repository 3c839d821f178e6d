use anyhow::{Context, Result};
use maplit::hashmap;
use std::fmt;
use strfmt::strfmt;

/// The Mapbox Static Images endpoint. Longitude comes before latitude.
pub const MAPBOX_STATIC_URL: &str = "https://api.mapbox.com/styles/v1/{style}/static/{lon},{lat},{zoom}/{width}x{height}?access_token={token}";

/// Parameters of the requested image that are fixed for a whole run.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageStyle {
    /// Mapbox style id, e.g. `mapbox/satellite-v9`.
    pub style_id: String,
    pub zoom: u8,
    pub width: u32,
    pub height: u32,
}

impl Default for ImageStyle {
    fn default() -> Self {
        Self {
            style_id: "mapbox/satellite-v9".to_owned(),
            zoom: 18,
            width: 600,
            height: 600,
        }
    }
}

/// A request URL template with the specifiers `{style}`, `{lon}`, `{lat}`,
/// `{zoom}`, `{width}`, `{height}` and `{token}`.
pub struct UrlTemplate {
    format_str: String,
    style: ImageStyle,
    token: String,
}

impl UrlTemplate {
    pub fn new(format_str: String, style: ImageStyle, token: String) -> Self {
        Self {
            format_str,
            style,
            token,
        }
    }

    /// A template for the public Mapbox endpoint.
    pub fn mapbox(style: ImageStyle, token: String) -> Self {
        Self::new(MAPBOX_STATIC_URL.to_owned(), style, token)
    }

    pub fn style(&self) -> &ImageStyle {
        &self.style
    }

    pub fn location_url(&self, lat: f64, lon: f64) -> Result<String> {
        let vars = hashmap! {
            "style".to_owned() => self.style.style_id.clone(),
            "lon".to_owned() => lon.to_string(),
            "lat".to_owned() => lat.to_string(),
            "zoom".to_owned() => self.style.zoom.to_string(),
            "width".to_owned() => self.style.width.to_string(),
            "height".to_owned() => self.style.height.to_string(),
            "token".to_owned() => self.token.clone(),
        };

        strfmt(&self.format_str, &vars).context("failed formatting URL")
    }
}

impl PartialEq for UrlTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.format_str == other.format_str
            && self.style == other.style
            && self.token == other.token
    }
}

// the token is a credential, keep it out of logs
impl fmt::Debug for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlTemplate")
            .field("format_str", &self.format_str)
            .field("style", &self.style)
            .field("token", &"<redacted>")
            .finish()
    }
}
