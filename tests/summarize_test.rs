mod utils;

use fars_reader::{Ingestor, YearId, summarize_with_config, summarize_years};
use utils::{Accident, Fixture};

fn years(values: &[i32]) -> Vec<YearId> {
    values.iter().copied().map(YearId::new).collect()
}

/// A missing year is skipped with a warning and the rest still summarize
#[test]
fn test_missing_year_is_skipped() {
    let fixture = Fixture::new();
    fixture.write_year(
        2015,
        &[
            Accident::in_month(1, 1),
            Accident::in_month(1, 1),
            Accident::in_month(6, 2),
        ],
    );

    let summary = summarize_years(&fixture.source(), &years(&[2013, 2015]));

    assert_eq!(summary.matrix.years(), &[YearId::new(2015)]);
    assert_eq!(summary.matrix.months(), &[1, 2]);
    assert_eq!(summary.matrix.get(YearId::new(2015), 1), Some(2));
    assert_eq!(summary.matrix.get(YearId::new(2015), 2), Some(1));

    assert_eq!(summary.warnings.len(), 1);
    assert_eq!(summary.warnings[0].year, "2013");
    assert!(summary.warnings[0].reason.contains("accident_2013.csv.bz2"));
}

#[test]
fn test_empty_request() {
    let fixture = Fixture::new();
    let summary = summarize_years(&fixture.source(), &[]);
    assert!(summary.matrix.is_empty());
    assert!(summary.matrix.months().is_empty());
    assert!(summary.warnings.is_empty());
}

/// Columns are the loadable years in ascending order, whatever the request order
#[test]
fn test_columns_ascending() {
    let fixture = Fixture::new();
    fixture.write_year(2014, &[Accident::in_month(1, 3)]);
    fixture.write_year(2013, &[Accident::in_month(1, 4)]);
    fixture.write_year(2016, &[Accident::in_month(1, 3)]);

    let summary = summarize_years(&fixture.source(), &years(&[2016, 2015, 2013, 2014]));
    assert_eq!(summary.matrix.years(), years(&[2013, 2014, 2016]).as_slice());
    assert_eq!(summary.matrix.months(), &[3, 4]);
    assert_eq!(summary.matrix.get(YearId::new(2013), 3), None);
    assert_eq!(summary.warnings.len(), 1);
}

/// Each year column adds up to the number of rows ingested for that year
#[test]
fn test_column_totals_match_row_counts() {
    let fixture = Fixture::new();
    let year_2013: Vec<Accident> = (0..40).map(|i| Accident::in_month(1, i % 12 + 1)).collect();
    let year_2014: Vec<Accident> = (0..7).map(|i| Accident::in_month(2, i % 3 + 5)).collect();
    fixture.write_year(2013, &year_2013);
    fixture.write_year(2014, &year_2014);

    let summary = summarize_years(&fixture.source(), &years(&[2013, 2014]));
    assert_eq!(summary.matrix.column_total(YearId::new(2013)), Some(40));
    assert_eq!(summary.matrix.column_total(YearId::new(2014)), Some(7));
    assert_eq!(summary.matrix.months().len(), 12);
}

#[test]
fn test_summaries_are_deterministic() {
    let fixture = Fixture::new();
    fixture.write_year(2013, &[Accident::in_month(1, 1), Accident::in_month(1, 9)]);
    fixture.write_year(2014, &[Accident::in_month(1, 9)]);
    let request = years(&[2014, 2012, 2013]);

    let first = summarize_years(&fixture.source(), &request);
    let second = summarize_years(&fixture.source(), &request);
    assert_eq!(first, second);
    assert_eq!(
        first.matrix.render("caption"),
        second.matrix.render("caption")
    );
}

/// A file without a MONTH column is an invalid year, not a fatal error
#[test]
fn test_unprojectable_year_is_skipped() {
    let fixture = Fixture::new();
    fixture.write_raw("accident_2014.csv", "STATE,DAY\n1,1\n");

    let config = fixture.config().with_pattern("accident_{year}.csv");
    let csv_summary = summarize_years(&config.source(), &years(&[2014]));
    assert!(csv_summary.matrix.is_empty());
    assert_eq!(csv_summary.warnings.len(), 1);
    assert!(csv_summary.warnings[0].reason.contains("MONTH"));
}

#[test]
fn test_parallel_ingestion_matches_sequential() {
    let fixture = Fixture::new();
    for year in 2010..2016 {
        let accidents: Vec<Accident> = (0..(year - 2005) as u32)
            .map(|i| Accident::in_month(1, i % 12 + 1))
            .collect();
        fixture.write_year(year, &accidents);
    }
    let request: Vec<String> = (2008..2018).map(|y| y.to_string()).collect();
    let source = fixture.source();

    let sequential = Ingestor::new(&source).ingest_requested(&request);
    let parallel = Ingestor::new(&source).parallel(true).ingest_requested(&request);
    assert_eq!(sequential, parallel);
    assert_eq!(parallel.present().count(), 6);
    assert_eq!(parallel.warnings().count(), 4);
}

/// A config asking for parallel loading summarizes exactly like a sequential run
#[test]
fn test_summarize_with_parallel_config() {
    let fixture = Fixture::new();
    for year in 2011..2015 {
        let accidents: Vec<Accident> = (1..=(year - 2009) as u32)
            .map(|m| Accident::in_month(1, m))
            .collect();
        fixture.write_year(year, &accidents);
    }
    let request = years(&[2014, 2010, 2011, 2012, 2013]);

    let sequential = summarize_with_config(&fixture.config(), &request);
    let parallel = summarize_with_config(&fixture.config().with_parallel(true), &request);
    assert_eq!(sequential, parallel);
    assert_eq!(parallel.matrix.years(), years(&[2011, 2012, 2013, 2014]).as_slice());
    assert_eq!(parallel.matrix.column_total(YearId::new(2014)), Some(5));
    assert_eq!(parallel.warnings.len(), 1);
    assert_eq!(parallel.warnings[0].year, "2010");
}

#[test]
fn test_rendered_summary() {
    let fixture = Fixture::new();
    fixture.write_year(2013, &[Accident::in_month(1, 1), Accident::in_month(1, 2)]);
    fixture.write_year(2014, &[Accident::in_month(1, 2)]);

    let summary = summarize_years(&fixture.source(), &years(&[2013, 2014]));
    let rendered = summary.matrix.render(fars_reader::DEFAULT_CAPTION);
    assert_eq!(
        rendered,
        "Table: Number of fatalities by month and year\n\
         \n\
         | MONTH | 2013 | 2014 |\n\
         |:-----:|:----:|:----:|\n\
         |   1   |  1   |      |\n\
         |   2   |  1   |  1   |\n"
    );
}
