use anyhow::{Context, Result, anyhow};
use log::info;

use crate::{cli::AppendArgs, session::Session, source};

pub fn execute(args: &AppendArgs) -> Result<()> {
    let mut session = Session::new(crate::load_config(args.config.as_deref())?);
    crate::upload_from_path(&mut session, &args.input)?;

    for assignment in &args.values {
        let (column, value) = parse_assignment(assignment)?;
        session
            .set_field(column, value)
            .with_context(|| format!("Setting field from '{assignment}'"))?;
    }

    let event = session
        .submit_form()
        .with_context(|| format!("Appending to {:?}", args.input))?;
    info!("{:?}", event);

    let bytes = session
        .export(&args.output)
        .with_context(|| format!("Serializing dataset for {:?}", args.output))?;
    source::export_to_path(&args.output, &bytes)
        .with_context(|| format!("Writing {:?}", args.output))?;
    info!(
        "✓ Wrote {} row(s) to {:?}",
        session.dataset()?.len(),
        args.output
    );
    Ok(())
}

fn parse_assignment(assignment: &str) -> Result<(&str, &str)> {
    let (column, value) = assignment
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected column=value but found '{assignment}'"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(anyhow!("Assignment '{assignment}' is missing a column"));
    }
    Ok((column, value))
}
