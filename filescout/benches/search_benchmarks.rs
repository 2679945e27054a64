use criterion::{black_box, criterion_group, criterion_main, Criterion};
use filescout::search::{content_matches, TermMatcher};
use filescout::{search, SearchRequest};
use std::{fs::File, io::Write, time::Duration};
use tempfile::tempdir;

fn create_test_files(
    dir: &tempfile::TempDir,
    file_count: usize,
    lines_per_file: usize,
) -> std::io::Result<()> {
    for i in 0..file_count {
        let file_path = dir.path().join(format!("test_{}.txt", i));
        let mut file = File::create(file_path)?;
        for j in 0..lines_per_file {
            writeln!(
                file,
                "Line {} TODO: fix bug {} FIXME: optimize line {} NOTE: important task {}",
                j, j, j, j
            )?;
        }
    }
    Ok(())
}

fn bench_matcher(c: &mut Criterion) {
    let haystack: Vec<u8> = (0..10_000)
        .flat_map(|i| format!("line {} with some filler text\n", i).into_bytes())
        .chain(b"the needle is here".iter().copied())
        .collect();
    let terms = vec!["absent".to_string(), "needle".to_string()];
    let matcher = TermMatcher::new(terms.clone());

    let mut group = c.benchmark_group("Matcher");
    group.bench_function("content_matches", |b| {
        b.iter(|| black_box(content_matches(black_box(&haystack), &terms)));
    });
    group.bench_function("term_matcher", |b| {
        b.iter(|| black_box(matcher.matches_content(black_box(&haystack))));
    });
    group.finish();
}

fn bench_file_scaling(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let file_counts = [10, 100, 1000];

    let mut group = c.benchmark_group("File Scaling");
    for count in file_counts {
        let dir = tempdir().unwrap();
        create_test_files(&dir, count, 10).unwrap();
        let request = SearchRequest::new(dir.path(), ["FIXME"]).with_deadline(Duration::from_secs(60));

        group.bench_function(format!("files_{}", count), |b| {
            b.iter(|| black_box(runtime.block_on(search(&request))));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_matcher, bench_file_scaling);
criterion_main!(benches);
