use crate::hub::*;

/// Writes to the given file, or to the standard output for `stdout` or no path.
pub fn write_output(path: Option<&str>, contents: &str) -> HubResult<()> {
    match path {
        None | Some("stdout") | Some("") => {
            println!("{}", contents);
        }
        Some(p) => {
            info!("Writing output to {:?}", p);
            fs::write(p, contents).context(WritingOutputSnafu { path: p })?;
        }
    }
    Ok(())
}
