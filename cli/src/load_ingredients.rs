use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs::File;

#[derive(Debug, Serialize)]
struct CreateIngredientRequest<'a> {
    name: &'a str,
    measurement_unit: &'a str,
}

/// Read a two-column CSV (name, measurement unit) and create one ingredient
/// per row through the API. Rows that already exist (409) are skipped.
pub async fn load_ingredients(server: &str, token: &str, path: &str) -> Result<()> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(file);

    let client = reqwest::Client::new();
    let url = format!("{}/api/ingredients", server);

    let mut created = 0usize;
    let mut skipped = 0usize;

    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to parse CSV line {}", line + 1))?;

        let name = record
            .get(0)
            .with_context(|| format!("Missing name on line {}", line + 1))?
            .trim();
        let measurement_unit = record
            .get(1)
            .with_context(|| format!("Missing measurement unit on line {}", line + 1))?
            .trim();

        if name.is_empty() {
            continue;
        }

        let response = client
            .post(&url)
            .bearer_auth(token)
            .json(&CreateIngredientRequest {
                name,
                measurement_unit,
            })
            .send()
            .await
            .context("Request failed")?;

        match response.status() {
            reqwest::StatusCode::CREATED => created += 1,
            reqwest::StatusCode::CONFLICT => skipped += 1,
            status => {
                let body = response.text().await.unwrap_or_default();
                bail!("Server rejected '{}' with {}: {}", name, status, body);
            }
        }
    }

    println!("Created {} ingredients, skipped {} existing", created, skipped);

    Ok(())
}
