//! Console tables for analysis reports.

use chrono::DateTime;
use stanza::style::{HAlign, Header, MinWidth, Styles};
use stanza::table::{Cell, Col, Row, Table};

use crate::analysis::ScorelineMass;
use crate::candidates::CandidateScore;
use crate::intensity::ScoringIntensities;
use crate::movement::{PriceMovement, Trend};
use crate::pricing::MarketEvaluation;
use crate::value::RecommendationEntry;

/// Marker appended to recommendations whose value exceeds the highlight threshold.
pub const HIGHLIGHT: &str = "💎";

fn right(text: String) -> Cell {
    Cell::new(Styles::default().with(HAlign::Right), text.into())
}

fn left(text: String) -> Cell {
    Cell::new(Styles::default(), text.into())
}

fn header(titles: &[&str]) -> Row {
    Row::new(
        Styles::default().with(Header(true)),
        titles.iter().map(|&title| title.into()).collect(),
    )
}

fn cols(min_widths: &[usize]) -> Vec<Col> {
    min_widths
        .iter()
        .map(|&min_width| Col::new(Styles::default().with(MinWidth(min_width))))
        .collect()
}

pub fn format_timestamp(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|datetime| datetime.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| millis.to_string())
}

pub fn tabulate_intensities(intensities: &ScoringIntensities) -> Table {
    Table::default()
        .with_cols(cols(&[10, 10]))
        .with_row(header(&["Home λ", "Away λ"]))
        .with_row(Row::new(
            Styles::default(),
            vec![
                right(format!("{:.3}", intensities.home)),
                right(format!("{:.3}", intensities.away)),
            ],
        ))
}

pub fn tabulate_scorelines(scorelines: &[ScorelineMass]) -> Table {
    let mut table = Table::default()
        .with_cols(cols(&[8, 12]))
        .with_row(header(&["Score", "Probability"]));
    table.push_rows(scorelines.iter().map(|scoreline| {
        Row::new(
            Styles::default(),
            vec![
                right(scoreline.score.to_string()),
                right(format!("{:.2}%", scoreline.prob * 100.0)),
            ],
        )
    }));
    table
}

pub fn tabulate_markets(markets: &[MarketEvaluation]) -> Table {
    let mut table = Table::default()
        .with_cols(cols(&[26, 8, 8, 8, 8, 10]))
        .with_row(header(&["Market", "Odd", "Win", "Push", "Loss", "Fair price"]));
    table.push_rows(markets.iter().map(|market| {
        let mut cells = vec![left(market.name.clone()), right(market.odd_id.to_string())];
        match &market.outcome {
            Ok(priced) => cells.extend([
                right(format!("{:.2}%", priced.result.win_pct)),
                right(format!("{:.2}%", priced.result.push_pct)),
                right(format!("{:.2}%", priced.result.loss_pct)),
                right(format!("{:.3}", priced.fair_price)),
            ]),
            Err(_) => cells.extend([
                right("0.00%".to_string()),
                right("-".to_string()),
                right("-".to_string()),
                right("-".to_string()),
            ]),
        }
        Row::new(Styles::default(), cells)
    }));
    table
}

pub fn tabulate_candidates(candidates: &[CandidateScore]) -> Table {
    let mut table = Table::default()
        .with_cols(cols(&[8, 12]))
        .with_row(header(&["Score", "Confidence"]));
    table.push_rows(candidates.iter().map(|candidate| {
        Row::new(
            Styles::default(),
            vec![
                right(candidate.score.to_string()),
                right(format!("{:.1}", candidate.confidence)),
            ],
        )
    }));
    table
}

pub fn tabulate_recommendations(entries: &[RecommendationEntry]) -> Table {
    let mut table = Table::default()
        .with_cols(cols(&[26, 8, 10, 10, 8, 10, 24]))
        .with_row(header(&[
            "Market",
            "Price",
            "Top cover",
            "All cover",
            "Value",
            "Fair price",
            "Scores",
        ]));
    table.push_rows(entries.iter().map(|entry| {
        let name = if entry.highlighted {
            format!("{} {HIGHLIGHT}", entry.market_name)
        } else {
            entry.market_name.clone()
        };
        let scores = entry
            .contributing
            .iter()
            .map(|candidate| format!("{} ({:.0})", candidate.score, candidate.confidence))
            .collect::<Vec<_>>()
            .join(", ");
        Row::new(
            Styles::default(),
            vec![
                left(name),
                right(format!("{:.2}", entry.latest_price)),
                right(format!("{:.1}%", entry.coverage_top)),
                right(format!("{:.1}%", entry.coverage_all)),
                right(format!("{:.3}", entry.value_score)),
                right(
                    entry
                        .fair_price
                        .map(|fair_price| format!("{fair_price:.3}"))
                        .unwrap_or_else(|| "-".to_string()),
                ),
                left(scores),
            ],
        )
    }));
    table
}

pub fn tabulate_movements(movements: &[PriceMovement]) -> Table {
    let mut table = Table::default()
        .with_cols(cols(&[26, 18, 8, 18, 8, 10]))
        .with_row(header(&["Market", "Opened", "Price", "Latest", "Price", "Change"]));
    table.push_rows(movements.iter().map(|movement| {
        let arrow = match movement.trend {
            Trend::Rise => "↑",
            Trend::Drop => "↓",
        };
        let mut change = format!("{arrow} {:+.1}%", movement.change_pct);
        if movement.significant {
            change.push_str(" !");
        }
        Row::new(
            Styles::default(),
            vec![
                left(movement.market_name.clone()),
                left(format_timestamp(movement.opening_timestamp)),
                right(format!("{:.2}", movement.opening_price)),
                left(format_timestamp(movement.latest_timestamp)),
                right(format!("{:.2}", movement.latest_price)),
                right(change),
            ],
        )
    }));
    table
}
