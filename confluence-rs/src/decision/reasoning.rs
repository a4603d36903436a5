//! Human-readable reasoning for decisions

use crate::analysis::TimeframeAnalysis;
use crate::decision::Signal;
use crate::types::TrendBias;

fn structure_line(analysis: &TimeframeAnalysis) -> Option<String> {
    if analysis.market_structure_tags.is_empty() {
        return None;
    }
    let tags: Vec<String> = analysis
        .market_structure_tags
        .iter()
        .map(ToString::to_string)
        .collect();
    Some(format!(
        "Market structure on {}: {}",
        analysis.timeframe,
        tags.join(", ")
    ))
}

/// Ordered justification lines drawn from the dominant timeframe.
///
/// The summary line always comes first; RSI, EMA, divergence, structure and
/// the strongest pattern agreeing with the signal follow when present.
pub fn build_reasoning(
    signal: Signal,
    final_confidence: f64,
    dominant: Option<&TimeframeAnalysis>,
) -> Vec<String> {
    let mut lines = Vec::new();
    let Some(analysis) = dominant else {
        lines.push(format!(
            "{} at {:.1}% fused confidence: no timeframe with sufficient data",
            signal,
            final_confidence * 100.0
        ));
        return lines;
    };
    let tf = &analysis.timeframe;

    lines.push(format!(
        "{} at {:.1}% fused confidence, led by {} ({} trend)",
        signal,
        final_confidence * 100.0,
        tf,
        analysis.trend
    ));

    if analysis.rsi < 30.0 {
        lines.push(format!("RSI {:.1} on {} is oversold", analysis.rsi, tf));
    } else if analysis.rsi > 70.0 {
        lines.push(format!("RSI {:.1} on {} is overbought", analysis.rsi, tf));
    }

    match analysis.ema_status {
        TrendBias::Bullish => lines.push(format!("EMA8 above EMA21 on {}", tf)),
        TrendBias::Bearish => lines.push(format!("EMA8 below EMA21 on {}", tf)),
        TrendBias::Neutral => {}
    }

    let div = &analysis.divergence;
    if div.bullish {
        lines.push(format!(
            "Bullish RSI divergence on {} (strength {:.0})",
            tf, div.strength
        ));
    } else if div.bearish {
        lines.push(format!(
            "Bearish RSI divergence on {} (strength {:.0})",
            tf, div.strength
        ));
    }

    if let Some(line) = structure_line(analysis) {
        lines.push(line);
    }

    let wanted = signal.bias();
    let supporting = analysis
        .top_patterns()
        .into_iter()
        .find(|p| wanted == TrendBias::Neutral || p.trend == wanted);
    if let Some(pattern) = supporting {
        lines.push(format!(
            "{} on {} (significance {:.0}): {}",
            pattern.pattern, tf, pattern.significance, pattern.description
        ));
    }

    lines
}

/// Short indicator labels backing the decision
pub fn supporting_indicators(dominant: Option<&TimeframeAnalysis>) -> Vec<String> {
    let Some(analysis) = dominant else {
        return Vec::new();
    };
    let tf = &analysis.timeframe;
    let mut labels = vec![format!("RSI(14) {:.1} [{}]", analysis.rsi, tf)];

    if let (Some(fast), Some(slow)) = (analysis.ema_fast, analysis.ema_slow) {
        labels.push(format!("EMA8 {:.4} / EMA21 {:.4} [{}]", fast, slow, tf));
    }
    if analysis.divergence.is_present() {
        labels.push(format!("Divergence {:.0} [{}]", analysis.divergence.strength, tf));
    }
    for tag in &analysis.market_structure_tags {
        labels.push(format!("{} [{}]", tag, tf));
    }
    if let Some(poc) = analysis.volume_support_levels.first() {
        labels.push(format!("Volume support {:.4} [{}]", poc, tf));
    }
    if let Some(fib) = &analysis.fibonacci {
        if let Some(level) = fib.nearest(analysis.price) {
            labels.push(format!("Fib {:.3} at {:.4} [{}]", level.ratio, level.price, tf));
        }
    }
    labels
}
