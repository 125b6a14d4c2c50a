use std::io::Write;

use clap::Args;
use daywise_core::{Config, Prediction, ScoringInput};

/// Inputs for a productivity prediction. Defaults mirror a typical day.
#[derive(Args, Debug, Clone)]
pub struct PredictArgs {
    /// Hours of sleep (0-10)
    #[arg(long, default_value_t = 7.0)]
    pub sleep: f64,
    /// Hours of focused work (0-10)
    #[arg(long, default_value_t = 4.0)]
    pub focus: f64,
    /// Workload level (1-5)
    #[arg(long, default_value_t = 3)]
    pub workload: u8,
    /// Minutes of exercise (0-120)
    #[arg(long, default_value_t = 20)]
    pub exercise: u32,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PredictArgs {
    pub fn predict(&self) -> Result<Prediction, Box<dyn std::error::Error>> {
        let input = ScoringInput::new(self.sleep, self.focus, self.workload, self.exercise)?;
        Ok(input.predict()?)
    }
}

pub fn run(args: PredictArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let prediction = args.predict()?;
    let mut out = std::io::stdout().lock();
    render(&prediction, args.json || config.output.json, &mut out)
}

/// Print a prediction as text or JSON.
pub fn render(
    prediction: &Prediction,
    json: bool,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let value = serde_json::json!({
            "score": prediction.score,
            "outlook": prediction.outlook,
            "message": prediction.outlook.message(),
            "tips": prediction.tip_texts(),
            "raw_score": prediction.raw_score,
            "terms": prediction.terms,
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        return Ok(());
    }

    writeln!(out, "Predicted productivity score: {}/100", prediction.score)?;
    writeln!(out, "{}", prediction.outlook.message())?;
    writeln!(out)?;
    writeln!(out, "Quick suggestions:")?;
    for tip in &prediction.tips {
        writeln!(out, "  • {tip}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use daywise_core::predict;

    #[test]
    fn text_output() {
        let prediction = predict(7.0, 4.0, 3, 20).unwrap();
        let mut out = Vec::new();
        render(&prediction, false, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Predicted productivity score: 64/100\n"));
        assert!(text.contains("Good, but can be improved."));
        assert!(text.contains("  • Keep the same routine. You're on track!"));
    }

    #[test]
    fn json_output() {
        let prediction = predict(0.0, 0.0, 5, 0).unwrap();
        let mut out = Vec::new();
        render(&prediction, true, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["score"], 0);
        assert_eq!(value["outlook"], "at_risk");
        assert_eq!(value["tips"].as_array().unwrap().len(), 4);
        assert_eq!(value["raw_score"], -15.0);

        let terms = value["terms"].as_array().unwrap();
        let names: Vec<&str> = terms.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(names, ["sleep", "focus", "workload", "exercise"]);
        assert_eq!(terms[0]["contribution"], -36.0);
        assert_eq!(terms[2]["contribution"], -14.0);
    }
}
