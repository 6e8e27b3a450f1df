use anyhow::Result;
use log::info;

use crate::{cli::PreviewArgs, session::Session, table};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let mut session = Session::new(crate::load_config(args.config.as_deref())?);
    crate::upload_from_path(&mut session, &args.input)?;
    let dataset = session.dataset()?;
    let rows = dataset
        .current_view()
        .iter()
        .take(args.rows)
        .collect::<Vec<_>>();

    table::print_table(dataset.columns(), &rows);
    info!(
        "Displayed {} of {} row(s) from {:?}",
        rows.len(),
        dataset.len(),
        args.input
    );
    Ok(())
}
