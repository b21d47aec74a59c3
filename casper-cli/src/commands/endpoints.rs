//! Endpoints command - print the endpoint table

use casper_lib::{Access, Endpoint};
use colored::Colorize;

use crate::ui;

pub fn run() {
    ui::header("Endpoints");
    for endpoint in Endpoint::ALL {
        let access = match endpoint.access() {
            Access::Bootstrap => "login".yellow(),
            Access::Resolved => "resolved".cyan(),
            Access::Session => "session".green(),
            Access::Public => "public".dimmed(),
        };
        println!(
            "  {:<18} {:<4} {:<24} {:>3}  {}",
            endpoint.name(),
            endpoint.method().as_str(),
            endpoint.path(),
            endpoint.expected_status(),
            access
        );
    }
}
