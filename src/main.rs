//! `tei2cbgm`: convert collation-editor TEI XML for open-cbgm.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
