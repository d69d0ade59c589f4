use serde_json::Value;

/// Fetch a Lottie animation JSON for the frontend header.
///
/// Purely decorative: any failure (network, non-200, bad JSON) is logged
/// and answered with `None`, and the caller renders without the animation.
pub async fn fetch_animation(url: &str) -> Option<Value> {
    match reqwest::get(url).await {
        Ok(response) => {
            if !response.status().is_success() {
                eprintln!(
                    "Animation fetch returned {} for {}",
                    response.status(),
                    url
                );
                return None;
            }
            match response.json::<Value>().await {
                Ok(json) => Some(json),
                Err(e) => {
                    eprintln!("Failed to parse animation JSON: {}", e);
                    None
                }
            }
        }
        Err(e) => {
            eprintln!("Failed to fetch animation: {}", e);
            None
        }
    }
}
