//! `info types` / `info states`: read-only catalog inspection, no I/O.

use clap::Subcommand;

#[derive(Subcommand)]
pub enum InfoCommand {
    /// List the TIGER/Line dataset kinds this catalog knows about
    Types,
    /// List the state and territory FIPS codes this catalog knows about
    States,
}

pub fn run(what: InfoCommand) {
    match what {
        InfoCommand::Types => print_types(),
        InfoCommand::States => print_states(),
    }
}

fn print_types() {
    println!("{:<12} {:<7} {:<7} {}", "KIND", "COUNTY?", "NATIONAL?", "LABEL");
    for kind in tiger_catalog::KINDS {
        println!(
            "{:<12} {:<7} {:<9} {}",
            kind.name(),
            kind.is_county_level(),
            kind.is_national(),
            kind.label()
        );
    }
}

fn print_states() {
    println!("{:<4} {:<10} {}", "FIPS", "KIND", "NAME");
    for fips in tiger_catalog::states::FIFTY_STATE_FIPS {
        println!("{fips:<4} {:<10} {}", "state", tiger_catalog::states::state_name(fips));
    }
    for fips in tiger_catalog::states::TERRITORY_FIPS {
        println!("{fips:<4} {:<10} {}", "territory", tiger_catalog::states::state_name(fips));
    }
}
