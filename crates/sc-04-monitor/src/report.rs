//! End-of-session reporting.

use crate::aggregator::{AggregateStats, AttackRecord};
use chrono::Utc;
use std::io::Write;
use std::path::Path;

/// Human-readable summary of a monitoring session, produced at shutdown.
pub struct SessionReport {
    stats: AggregateStats,
    attacks: Vec<AttackRecord>,
}

impl SessionReport {
    #[must_use]
    pub fn new(stats: AggregateStats, attacks: Vec<AttackRecord>) -> Self {
        Self { stats, attacks }
    }

    /// Session counters.
    #[must_use]
    pub fn stats(&self) -> &AggregateStats {
        &self.stats
    }

    /// Attacks observed during the session, in arrival order.
    #[must_use]
    pub fn attacks(&self) -> &[AttackRecord] {
        &self.attacks
    }

    /// Render the report as display text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let duration = Utc::now().signed_duration_since(self.stats.session_start);

        out.push_str("=== Session Report ===\n");
        out.push_str(&format!(
            "Session start:     {}\n",
            self.stats.session_start.to_rfc3339()
        ));
        out.push_str(&format!("Duration:          {}s\n", duration.num_seconds()));
        out.push_str(&format!("Messages observed: {}\n", self.stats.total()));
        out.push_str(&format!("  Normal:          {}\n", self.stats.normal_count));
        out.push_str(&format!("  Attacks:         {}\n", self.stats.attack_count));
        out.push_str(&format!("  Unknown:         {}\n", self.stats.unknown_count));
        out.push_str(&format!("  Errors:          {}\n", self.stats.error_count));
        out.push_str(&format!(
            "Attack rate:       {:.1}%\n",
            self.stats.attack_rate()
        ));
        out.push_str("Attack breakdown:\n");
        out.push_str(&format!(
            "  Plaintext tamper:  {}\n",
            self.stats.tamper_plaintext_count
        ));
        out.push_str(&format!(
            "  Ciphertext tamper: {}\n",
            self.stats.tamper_ciphertext_count
        ));
        out.push_str(&format!("  Replay:            {}\n", self.stats.replay_count));
        out.push_str(&format!("  Flood:             {}\n", self.stats.dos_count));

        if !self.attacks.is_empty() {
            out.push_str("Attack log:\n");
            for record in &self.attacks {
                out.push_str(&format!(
                    "  {} [{}] {} on {}\n",
                    record.observed_at.to_rfc3339(),
                    record.severity,
                    record.category,
                    record.label
                ));
            }
        }

        out
    }

    /// Write the attack log to a file, one record per line.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from creating or writing the file.
    pub fn write_attack_log(&self, path: &Path) -> std::io::Result<()> {
        let mut file = std::fs::File::create(path)?;
        writeln!(file, "# Attack log, session start {}", self.stats.session_start.to_rfc3339())?;
        for record in &self.attacks {
            writeln!(
                file,
                "{}\t{}\t{}\t{}",
                record.observed_at.to_rfc3339(),
                record.category,
                record.severity,
                record.label
            )?;
        }
        Ok(())
    }
}
