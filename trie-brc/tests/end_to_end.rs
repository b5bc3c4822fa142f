use std::io::Write;

use rstest::rstest;
use tempfile::NamedTempFile;
use trie_brc::{aggregate_file, render_report, PipelineConfig};

const SAMPLE: &str = "\
Hamburg;12.0
Bulawayo;8.9
Palembang;38.8
St. John's;15.2
Cracow;12.6
Bridgetown;26.9
Istanbul;6.2
Roseau;34.4
Conakry;31.2
Istanbul;23.0
";

const SAMPLE_REPORT: &str = "{Bridgetown=26.9/26.9/26.9, Bulawayo=8.9/8.9/8.9, \
Conakry=31.2/31.2/31.2, Cracow=12.6/12.6/12.6, Hamburg=12.0/12.0/12.0, \
Istanbul=6.2/14.6/23.0, Palembang=38.8/38.8/38.8, Roseau=34.4/34.4/34.4, \
St. John's=15.2/15.2/15.2}";

fn measurements(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

async fn report_for(contents: &str, config: PipelineConfig) -> String {
    let file = measurements(contents);
    let index = aggregate_file(file.path(), config).await.unwrap();
    render_report(&index)
}

#[rstest]
#[case::two_stations("a;5.0\nb;10.0\na;3.0\n", "{a=3.0/4.0/5.0, b=10.0/10.0/10.0}")]
#[case::single_record("x;-2.5\n", "{x=-2.5/-2.5/-2.5}")]
#[case::half_up_mean("r;1.0\nr;1.1\n", "{r=1.0/1.1/1.1}")]
#[case::integer_values("n;3\nn;-7\n", "{n=-7.0/-2.0/3.0}")]
#[case::missing_final_newline("a;1.0\nb;2.0", "{a=1.0/1.0/1.0, b=2.0/2.0/2.0}")]
#[case::empty_file("", "{}")]
#[tokio::test]
async fn reports(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(report_for(input, PipelineConfig::default()).await, expected);
}

#[rstest]
#[tokio::test]
async fn page_boundaries_do_not_matter(
    #[values(1, 2, 3, 7, 13, 64, 8192)] page_size: usize,
    #[values(2, 3, 4, 9)] in_flight: usize,
) {
    let config = PipelineConfig {
        page_size,
        in_flight,
    };
    assert_eq!(report_for(SAMPLE, config).await, SAMPLE_REPORT);
}

#[tokio::test]
async fn larger_file_matches_reference_statistics() {
    let stations = ["Abha", "Accra", "Adelaide", "Zürich", "Ürümqi", "Ab"];
    let mut contents = String::new();
    let mut expected = std::collections::BTreeMap::<&str, (i64, i64, i64, i64)>::new();
    for i in 0..20_000i64 {
        let name = stations[(i as usize * 7) % stations.len()];
        // tenths of a degree in [-99.9, 99.9]
        let tenths = (i * 37) % 1999 - 999;
        contents.push_str(&format!("{name};{}\n", tenths as f64 / 10.0));
        let entry = expected.entry(name).or_insert((i64::MAX, i64::MIN, 0, 0));
        entry.0 = entry.0.min(tenths);
        entry.1 = entry.1.max(tenths);
        entry.2 += tenths;
        entry.3 += 1;
    }

    let file = measurements(&contents);
    let config = PipelineConfig {
        page_size: 4096,
        in_flight: 4,
    };
    let index = aggregate_file(file.path(), config).await.unwrap();

    assert_eq!(index.len(), stations.len());
    let names: Vec<Vec<u8>> = index.traverse_sorted().map(|(name, _)| name).collect();
    let mut sorted = names.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(names, sorted);

    for (name, (min, max, sum, count)) in expected {
        let agg = index.lookup(name.as_bytes()).unwrap();
        assert_eq!(agg.count(), count as u64, "{name}");
        assert_eq!(agg.min(), min as f64 / 10.0, "{name}");
        assert_eq!(agg.max(), max as f64 / 10.0, "{name}");
        let mean = agg.mean().unwrap();
        let true_mean = sum as f64 / 10.0 / count as f64;
        assert!((mean - true_mean).abs() < 1e-9, "{name}: {mean} vs {true_mean}");
    }
}

#[tokio::test]
async fn malformed_value_fails_the_run() {
    let file = measurements("a;1.0\nb;1,5\n");
    let err = aggregate_file(file.path(), PipelineConfig::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("1,5"), "{err}");
}
