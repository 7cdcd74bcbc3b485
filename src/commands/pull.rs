use std::sync::Arc;

use crate::models::RefreshConfig;
use crate::services::{CacheStore, LiveGateway, PriceBoard, Refresher, SourceStatus, UpstreamGateway};

pub async fn run() {
    println!("🔄 Refreshing metal prices...\n");

    let config = match RefreshConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            RefreshConfig::print_config_help();
            std::process::exit(1);
        }
    };

    let cache = Arc::new(CacheStore::new(config.cache_dir.clone()));

    let gateway = match LiveGateway::from_config(&config) {
        Ok(gateway) => gateway,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let refresher = Refresher::new(
        Arc::new(gateway) as Arc<dyn UpstreamGateway>,
        cache,
        config,
    );

    refresher.hydrate().await;
    refresher.refresh_all(true).await;

    let board = refresher.snapshot().await;
    print_board(&board);

    if board
        .metals
        .iter()
        .any(|metal| metal.status == SourceStatus::Failed)
    {
        std::process::exit(1);
    }
}

fn print_board(board: &PriceBoard) {
    match &board.rate {
        Some(rate) => println!(
            "💱 USD/NPR: {:.4} (valid until {})",
            rate.rate_npr_per_usd,
            rate.valid_until.format("%Y-%m-%d %H:%M UTC")
        ),
        None => println!("💱 USD/NPR: unavailable"),
    }

    for metal in &board.metals {
        println!("\n═══════════════════════════════════════════");
        println!("🔹 {} ({})", metal.label, metal.symbol);

        if let Some(error) = &metal.error {
            println!("   ⚠️  {}", error);
        }

        match &metal.series {
            Some(series) => {
                if let Some(latest) = series.latest() {
                    println!("   Date:      {}", latest.date);
                    println!("   Per tola:  NPR {}", format_number(latest.price_per_tola_npr));
                    println!("   Per gram:  NPR {}", format_number(latest.price_per_gram_npr));
                    println!("   Change:    {:+.2}%", latest.percent_change);
                }
                println!("   History:   {} days", series.points.len());
            }
            None => println!("   No data available"),
        }
    }
    println!();
}

fn format_number(n: i64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_thousands_separators() {
        assert_eq!(format_number(302856), "302,856");
        assert_eq!(format_number(3651), "3,651");
        assert_eq!(format_number(12), "12");
    }
}
