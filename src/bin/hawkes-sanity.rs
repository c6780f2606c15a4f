//! hawkes-sanity - Convert one fixed record and print its events

use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use hawkes_prep::{convert_to_event_streams, ParserOptions, RawCustomerRecord};

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let data = vec![RawCustomerRecord::new(
        "C1",
        "HL|TWD|PL",
        "2000000|200000|500000",
        "42|45|47",
    )];

    let (streams, vocabulary) = match convert_to_event_streams(&data, &ParserOptions::default()) {
        Ok(converted) => converted,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("Number of event types: {}", vocabulary.size());
    println!("Number of customers: {}", streams.len());

    for stream in &streams {
        println!("\nCustomer {}:", stream.customer_id);
        for (j, event) in stream.events.iter().enumerate() {
            println!(
                "  Event {}: type={}, amount={:.0}, time_since_start={:.1}, time_gap={:.1}",
                j + 1,
                event.type_event,
                event.loan_amount,
                event.time_since_start,
                event.time_since_last_event
            );
        }
    }

    ExitCode::SUCCESS
}
