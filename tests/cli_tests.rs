//! End-to-end tests of the `bigseq` binary

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const FASTA: &str = ">s1 first\nACGTACGTAC\n>s2 second\nGGGGCCCC\n>s3 third\nTTTT\n";

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn bigseq() -> Command {
    let mut cmd = Command::cargo_bin("bigseq").unwrap();
    cmd.args(["--partitions", "2", "--threads", "2"]);
    cmd
}

fn headers(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter_map(|l| l.strip_prefix('>'))
        .map(String::from)
        .collect()
}

#[test]
fn test_head_writes_first_records() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "in.fa", FASTA);

    bigseq()
        .args(["head", "-n", "2"])
        .arg(&input)
        .assert()
        .success()
        .stdout(">s1 first\nACGTACGTAC\n>s2 second\nGGGGCCCC\n");
}

#[test]
fn test_range_with_negative_start() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "in.fa", FASTA);
    let output = dir.path().join("out.fa");

    bigseq()
        .args(["range", "-r", "-2:"])
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();
    assert_eq!(headers(&output), vec!["s2 second", "s3 third"]);
}

#[test]
fn test_range_rejects_zero() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "in.fa", FASTA);

    bigseq()
        .args(["range", "-r", "0:2"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("range"));
}

#[test]
fn test_sort_by_length_with_line_width() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "in.fa", FASTA);

    bigseq()
        .args(["sort", "--by-length", "-w", "4"])
        .arg(&input)
        .assert()
        .success()
        .stdout(">s3 third\nTTTT\n>s2 second\nGGGG\nCCCC\n>s1 first\nACGT\nACGT\nAC\n");
}

#[test]
fn test_sort_rejects_conflicting_keys() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "in.fa", FASTA);

    bigseq()
        .args(["sort", "--by-seq", "--set", "by-name=true"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("mutually exclusive"));
}

#[test]
fn test_unknown_override_fails() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "in.fa", FASTA);

    bigseq()
        .args(["shuffle", "--set", "colour=blue"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("colour"));
}

#[test]
fn test_rmdup_reports_duplicates() {
    let dir = TempDir::new().unwrap();
    let input = write(
        &dir,
        "in.fa",
        ">a\nACGT\n>b\nACGT\n>c\nTTTT\n>d\nacgt\n",
    );
    let output = dir.path().join("out.fa");
    let report = dir.path().join("dups.txt");

    bigseq()
        .args(["rmdup", "--by-seq", "--ignore-case", "-D"])
        .arg(&report)
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let mut kept = headers(&output);
    kept.sort();
    assert_eq!(kept, vec!["a", "c"]);
    assert_eq!(fs::read_to_string(&report).unwrap(), "3\ta, b, d\n");
}

#[test]
fn test_common_across_files() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.fa", FASTA);
    let b = write(&dir, "b.fa", ">s3 other\nAAAA\n>s9\nCC\n>s1\nGG\n");

    let output = dir.path().join("common.fa");
    bigseq()
        .arg("common")
        .arg(&a)
        .arg(&b)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let mut found = headers(&output);
    found.sort();
    assert_eq!(found, vec!["s1 first", "s3 third"]);
}

#[test]
fn test_faidx_index_and_regions() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "in.fa", FASTA);

    bigseq()
        .arg("faidx")
        .arg(&input)
        .assert()
        .success()
        .stdout("s1\t10\t10\t10\t11\ns2\t8\t32\t8\t9\ns3\t4\t51\t4\t5\n");

    bigseq()
        .arg("faidx")
        .arg(&input)
        .args(["s1:2-5", "s2:4-1"])
        .assert()
        .success()
        .stdout(">s1:2-5\nCGTA\n>s2:4-1\nCCCC\n");
}

#[test]
fn test_faidx_index_follows_input_wrapping() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "in.fa", ">chr1 desc\nACGT\nACGT\nAC\n>chr2\nGGGG\nCC\n");

    bigseq()
        .args(["faidx", "-w", "0"])
        .arg(&input)
        .assert()
        .success()
        .stdout("chr1\t10\t11\t4\t5\nchr2\t6\t30\t4\t5\n");

    let ragged = write(&dir, "ragged.fa", ">chr1\nACGT\nAC\nACGT\n");
    bigseq()
        .arg("faidx")
        .arg(&ragged)
        .assert()
        .failure()
        .stderr(predicate::str::contains("different line length in sequence: chr1"));
}

#[test]
fn test_faidx_json_index() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "in.fa", FASTA);

    bigseq()
        .args(["faidx", "--format", "json"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"s2\"").and(predicate::str::contains("\"offset\": 32")));
}

#[test]
fn test_head_genome() {
    let dir = TempDir::new().unwrap();
    let input = write(
        &dir,
        "genomes.fa",
        ">a1 Vibrio cholerae strain M29 Contig_1\nAC\n\
         >a2 Vibrio cholerae strain M29 Contig_2\nGT\n\
         >b1 Vibrio cholerae strain 2012HC-12 NODE_79\nTT\n",
    );
    let output = dir.path().join("first.fa");

    bigseq()
        .arg("head-genome")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();
    assert_eq!(
        headers(&output),
        vec![
            "a1 Vibrio cholerae strain M29 Contig_1",
            "a2 Vibrio cholerae strain M29 Contig_2"
        ]
    );
}

#[test]
fn test_quiet_override_silences_warnings() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "in.fa", FASTA);

    bigseq()
        .args(["sample", "-n", "10"])
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("Requested more records than available"));

    bigseq()
        .args(["sample", "-n", "10", "--set", "quiet=true"])
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_gzip_round_trip() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "in.fa", FASTA);
    let compressed = dir.path().join("out.fa.gz");

    bigseq()
        .args(["duplicate", "-n", "2"])
        .arg(&input)
        .arg("-o")
        .arg(&compressed)
        .assert()
        .success();

    bigseq()
        .args(["head", "-n", "3"])
        .arg(&compressed)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(">s1 first\nACGTACGTAC\n>s1 first\n"));
}

#[test]
fn test_fastq_sample_everything() {
    let dir = TempDir::new().unwrap();
    let fastq = "@r1\nACGT\n+\nIIII\n@r2\nGG\n+\n##\n";
    let input = write(&dir, "in.fq", fastq);

    bigseq()
        .args(["sample", "-p", "1"])
        .arg(&input)
        .assert()
        .success()
        .stdout(fastq);
}

#[test]
fn test_sample_requires_amount() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "in.fa", FASTA);

    bigseq()
        .arg("sample")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("proportion"));
}
