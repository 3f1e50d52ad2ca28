//! `tracing` output for generated SQL.

use tracing::Level;

/// Controls the `tracing` event emitted before each statement reaches the host.
///
/// Events use the target `tablekit.sql` and carry the table, an operation tag,
/// the parameter count and the rendered SQL.
#[derive(Debug, Clone)]
pub struct SqlLog {
    /// Emit events at all.
    pub enabled: bool,
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for SqlLog {
    fn default() -> Self {
        Self {
            enabled: true,
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }
}

impl SqlLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Silence SQL events.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    fn truncate_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)).into(),
            _ => sql.into(),
        }
    }

    pub(crate) fn emit(&self, table: &str, op: &str, sql: &str, param_count: usize) {
        if !self.enabled {
            return;
        }

        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let sql = self.truncate_sql(sql);
        emit_at_level!(
            self.level,
            target: "tablekit.sql",
            table,
            op,
            param_count,
            sql = %sql,
        );
    }
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate_sql_bytes("héllo", 2), "h");
        assert_eq!(truncate_sql_bytes("hello", 10), "hello");
    }

    #[test]
    fn truncation_marks_ellipsis() {
        let log = SqlLog::new().max_sql_length(6);
        assert_eq!(log.truncate_sql("SELECT * FROM t"), "SELECT...");
        assert_eq!(SqlLog::new().no_truncate().truncate_sql("SELECT 1"), "SELECT 1");
    }
}
