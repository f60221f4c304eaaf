use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::io::Write;

/// Everything recorded about one round once it has been observed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundRecord {
    pub round: usize,
    pub ruleset: String,
    pub num_decks: usize,
    pub depth_threshold: f64,
    pub fraction_dealt: f64,
    pub seats: Vec<u32>,
    pub payouts: Vec<f32>,
    pub balances: Vec<f32>,
    /// `None` while a player has staked nothing.
    pub profit_per_dollar: Vec<Option<f32>>,
}

impl RoundRecord {
    /// Column names matching the CSV line, players labelled by seat.
    pub fn header(&self) -> String {
        let mut columns = vec![
            "round".to_string(),
            "ruleset".to_string(),
            "num_decks".to_string(),
            "depth_threshold".to_string(),
            "fraction_dealt".to_string(),
        ];
        for name in ["payout", "balance", "profit_per_dollar"] {
            columns.extend(self.seats.iter().map(|seat| format!("p{}_{}", seat, name)));
        }
        columns.join(",")
    }
}

impl Display for RoundRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{},{},{:.4}",
            self.round, self.ruleset, self.num_decks, self.depth_threshold, self.fraction_dealt
        )?;
        for payout in &self.payouts {
            write!(f, ",{}", payout)?;
        }
        for balance in &self.balances {
            write!(f, ",{}", balance)?;
        }
        for ppd in &self.profit_per_dollar {
            match ppd {
                Some(ppd) => write!(f, ",{:.4}", ppd)?,
                None => write!(f, ",nan")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    #[default]
    Csv,
    Json,
}

/// Writes one line per round to any writer, as CSV or JSON lines.
pub struct RecordWriter<'a> {
    writer: &'a mut dyn Write,
    format: RecordFormat,
    header: bool,
}

impl<'a> RecordWriter<'a> {
    pub fn new(writer: &'a mut dyn Write, format: RecordFormat) -> RecordWriter<'a> {
        RecordWriter {
            writer,
            format,
            header: false,
        }
    }

    /// Writes a CSV header line before the first record.
    pub fn with_header(mut self) -> RecordWriter<'a> {
        self.header = self.format == RecordFormat::Csv;
        self
    }

    pub fn write(&mut self, record: &RoundRecord) -> std::io::Result<()> {
        if self.header {
            writeln!(self.writer, "{}", record.header())?;
            self.header = false;
        }
        match self.format {
            RecordFormat::Csv => writeln!(self.writer, "{}", record),
            RecordFormat::Json => {
                serde_json::to_writer(&mut *self.writer, record)?;
                writeln!(self.writer)
            }
        }
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn record() -> RoundRecord {
        RoundRecord {
            round: 4,
            ruleset: "S17".to_string(),
            num_decks: 6,
            depth_threshold: 0.75,
            fraction_dealt: 0.125,
            seats: vec![1, 3],
            payouts: vec![1.5, -1.0],
            balances: vec![2.5, -3.0],
            profit_per_dollar: vec![Some(0.5), None],
        }
    }

    #[test]
    fn csv_line() {
        assert_eq!(
            record().to_string(),
            "4,S17,6,0.75,0.1250,1.5,-1,2.5,-3,0.5000,nan"
        );
        assert_eq!(
            record().header(),
            "round,ruleset,num_decks,depth_threshold,fraction_dealt,\
             p1_payout,p3_payout,p1_balance,p3_balance,p1_profit_per_dollar,p3_profit_per_dollar"
        );
    }

    #[test]
    fn header_written_once() {
        let mut buf: Vec<u8> = Vec::new();
        {
            let mut writer = RecordWriter::new(&mut buf, RecordFormat::Csv).with_header();
            writer.write(&record()).unwrap();
            writer.write(&record()).unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        let lines = text.lines().collect::<Vec<&str>>();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("round,"));
        assert_eq!(lines[1], lines[2]);
    }

    #[test]
    fn json_lines() {
        let mut buf: Vec<u8> = Vec::new();
        {
            let mut writer = RecordWriter::new(&mut buf, RecordFormat::Json).with_header();
            writer.write(&record()).unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["round"], 4);
        assert_eq!(value["ruleset"], "S17");
        assert_eq!(value["seats"], serde_json::json!([1, 3]));
        assert_eq!(value["profit_per_dollar"][1], serde_json::Value::Null);
    }
}
