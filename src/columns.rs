//! Column profile listing.
//!
//! Renders each column's classification and its distinct values, either as an
//! ASCII table or as JSON for tooling that builds input forms.

use anyhow::{Context, Result};
use log::info;

use crate::{cli::ColumnsArgs, session::Session, table};

const MAX_LISTED_VALUES: usize = 5;

pub fn execute(args: &ColumnsArgs) -> Result<()> {
    let mut session = Session::new(crate::load_config(args.config.as_deref())?);
    crate::upload_from_path(&mut session, &args.input)?;
    let profiles = session.profiles()?;

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&profiles).context("Serializing column profiles")?;
        println!("{rendered}");
        return Ok(());
    }

    let mut rows = Vec::with_capacity(profiles.len());
    for (idx, profile) in profiles.iter().enumerate() {
        rows.push(vec![
            (idx + 1).to_string(),
            profile.name.clone(),
            profile.kind.to_string(),
            profile.distinct_values.len().to_string(),
            summarize_values(&profile.distinct_values),
        ]);
    }
    let headers = ["#", "name", "kind", "distinct", "values"]
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);
    info!("Listed {} column(s) from {:?}", profiles.len(), args.input);
    Ok(())
}

fn summarize_values(values: &[String]) -> String {
    let mut summary = values
        .iter()
        .take(MAX_LISTED_VALUES)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if values.len() > MAX_LISTED_VALUES {
        summary.push_str(&format!(", … (+{})", values.len() - MAX_LISTED_VALUES));
    }
    summary
}
