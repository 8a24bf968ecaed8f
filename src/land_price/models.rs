use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct ApiPriceResponse {
    pub price_usd_per_m2: f64,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_confidence() -> f64 {
    0.7
}
