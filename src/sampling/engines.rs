use super::{quote_backtick, quote_double, quote_qualified, sampling_fraction, SamplingStrategy};

fn order_by_random(
    table: &str,
    column: &str,
    sample_size: usize,
    quote: fn(&str) -> String,
    random_fn: &str,
) -> String {
    format!(
        "SELECT DISTINCT {col} FROM {table} ORDER BY {random_fn}() LIMIT {sample_size}",
        col = quote(column),
        table = quote_qualified(table, quote),
    )
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlSampling;

impl SamplingStrategy for MySqlSampling {
    fn sample_query(&self, table: &str, column: &str, sample_size: usize) -> String {
        order_by_random(table, column, sample_size, quote_backtick, "RAND")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MariaDbSampling;

impl SamplingStrategy for MariaDbSampling {
    fn sample_query(&self, table: &str, column: &str, sample_size: usize) -> String {
        order_by_random(table, column, sample_size, quote_backtick, "RAND")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteSampling;

impl SamplingStrategy for SqliteSampling {
    fn sample_query(&self, table: &str, column: &str, sample_size: usize) -> String {
        order_by_random(table, column, sample_size, quote_double, "RANDOM")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresSampling;

impl SamplingStrategy for PostgresSampling {
    fn sample_query(&self, table: &str, column: &str, sample_size: usize) -> String {
        order_by_random(table, column, sample_size, quote_double, "RANDOM")
    }
}

/// Filters rows with `RAND()` instead of sorting the whole table.
///
/// BigQuery table paths (`project.dataset.table`) are quoted as one identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct BigQuerySampling;

impl SamplingStrategy for BigQuerySampling {
    fn sample_query(&self, table: &str, column: &str, sample_size: usize) -> String {
        format!(
            "SELECT DISTINCT {} FROM {} WHERE RAND() < {:?} LIMIT {}",
            quote_backtick(column),
            quote_backtick(table),
            sampling_fraction(sample_size),
            sample_size
        )
    }
}

/// `SAMPLE` narrows the scan for tables with a sampling key; the outer query
/// dedups and caps the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClickHouseSampling;

impl SamplingStrategy for ClickHouseSampling {
    fn sample_query(&self, table: &str, column: &str, sample_size: usize) -> String {
        let col = quote_backtick(column);
        format!(
            "SELECT DISTINCT {col} FROM (SELECT {col} FROM {} SAMPLE {:?} ORDER BY rand()) LIMIT {}",
            quote_qualified(table, quote_backtick),
            sampling_fraction(sample_size),
            sample_size
        )
    }
}
