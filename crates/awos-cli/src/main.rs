use std::time::Duration;

use anyhow::{bail, Result};
use awos_core::{AirportShape, Config};
use awos_weather::{AirportClient, MetarClient, ResponseShape, SessionController, SessionSnapshot};

#[tokio::main]
async fn main() -> Result<()> {
    awos_core::init()?;

    let mut args = std::env::args().skip(1);
    let icao = match args.next() {
        Some(icao) => icao.to_uppercase(),
        None => {
            eprintln!("Usage: awos <ICAO> [runway]");
            std::process::exit(2);
        }
    };
    let runway = args.next();

    // The controller does not validate identifiers; the caller does.
    if icao.len() != 4 || !icao.chars().all(|c| c.is_ascii_alphanumeric()) {
        bail!("'{}' is not a 4-character ICAO identifier", icao);
    }

    let (config, _validation) = Config::load_validated()?;

    let controller = build_controller(&config)?;
    if let Some(runway) = runway {
        controller.set_selected_runway(&runway);
    }

    if let Err(e) = controller.fetch_airport(&icao).await {
        tracing::warn!(error = %e, "airport lookup failed: {}", e.user_message());
    }
    controller.fetch_report(&icao).await?;
    print_snapshot(&controller.snapshot());

    if config.polling.refresh_minutes > 0 {
        let period = Duration::from_secs(u64::from(config.polling.refresh_minutes) * 60);
        controller.start_polling(&icao, period);
        tracing::info!(
            icao = %icao,
            minutes = config.polling.refresh_minutes,
            "polling started"
        );
    }

    let mut updates = controller.subscribe();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                print_snapshot(&updates.borrow_and_update().clone());
            }
        }
    }

    controller.reset();
    tracing::info!("session reset, exiting");
    Ok(())
}

fn build_controller(config: &Config) -> Result<SessionController> {
    let metar = MetarClient::new(&config.metar.base_url, config.metar.error_marker.as_deref())?;
    let airports = AirportClient::new(
        &config.airports.base_url,
        config.airports.api_key.as_deref(),
        match config.airports.shape {
            AirportShape::Object => ResponseShape::Object,
            AirportShape::Array => ResponseShape::Array,
        },
    )?;
    Ok(SessionController::new(metar, airports))
}

fn print_snapshot(snapshot: &SessionSnapshot) {
    if snapshot.raw_report.is_empty() {
        return;
    }

    println!();
    if let Some(airport) = &snapshot.airport {
        println!("{} ({})", airport.display_name(), airport.icao);
        if !airport.runways.is_empty() {
            let idents: Vec<&str> = airport.runways.iter().map(|r| r.ident.as_str()).collect();
            println!("Runways: {}", idents.join(", "));
        }
    }
    if !snapshot.selected_runway.is_empty() {
        println!("Selected runway: {}", snapshot.selected_runway);
    }
    println!("{}", snapshot.raw_report);
    match &snapshot.decoded_report {
        Some(decoded) => println!("Decoded station: {}", decoded.station),
        None => println!("(report could not be decoded)"),
    }
    if let Some(updated) = snapshot.last_updated {
        println!("Updated: {}", updated.format("%H:%M:%SZ"));
    }
}
