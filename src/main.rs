//! # archive-steward CLI
//!
//! Command-line interface for archive maintenance.
//!
//! ## Usage
//! ```bash
//! archive-steward organize ~/Archive --field type
//! archive-steward duplicates ~/Archive --remove --output json
//! archive-steward report ~/Archive report.txt
//! ```

mod cli;

use archive_steward::Result;

fn main() -> Result<()> {
    archive_steward::init_tracing();
    cli::run()
}
