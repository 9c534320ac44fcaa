//! Tests for the fix command and the analyzer over project trees.
use anyhow::Result;
use collector::analyzer::Collector;
use collector::commands::{run_fix, FixOptions};
use collector::config::Config;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn write(root: &Path, relative: &str, content: &str) -> Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

fn apply_options(temp: &TempDir) -> FixOptions {
    FixOptions {
        apply: true,
        verbose: false,
        analysis_root: temp.path().to_path_buf(),
    }
}

#[test]
fn test_fix_project_tree() -> Result<()> {
    let temp = tempdir()?;
    write(
        temp.path(),
        "app/Jobs/SendMail.php",
        "<?php
class SendMail
{
    public function handle()
    {
        foreach ($this->recipients as $recipient) {
            $this->mailer->send($recipient, $this->subject);
        }
    }
}
",
    )?;
    write(
        temp.path(),
        "app/helpers.php",
        "<?php
function total(array $lines)
{
    $sum = 0;
    foreach ($lines as $line) {
        if ($line->skip) {
            continue;
        }
        $sum += $line->amount;
    }
    return $sum;
}
",
    )?;

    let results = Collector::new().analyze(&[temp.path().to_path_buf()]);
    assert_eq!(results.summary.total_files, 2);
    assert_eq!(results.summary.total_loops, 2);
    assert_eq!(results.summary.fixable_loops, 1);

    let fixed = run_fix(&results, &apply_options(&temp), Vec::new())?;
    assert_eq!(fixed.len(), 1);
    assert!(fixed[0].file.ends_with("app/Jobs/SendMail.php"));

    let content = fs::read_to_string(temp.path().join("app/Jobs/SendMail.php"))?;
    assert!(content.contains(
        "collect($this->recipients)->each(function($recipient)  {$this->mailer->send($recipient, $this->subject);});"
    ));

    let untouched = fs::read_to_string(temp.path().join("app/helpers.php"))?;
    assert!(untouched.contains("foreach ($lines as $line)"));
    Ok(())
}

#[test]
fn test_fix_several_loops_in_one_file() -> Result<()> {
    let temp = tempdir()?;
    write(
        temp.path(),
        "index.php",
        "<?php
foreach ($a as $x) { echo $x; }
echo 'between';
foreach ($b as $k => $y) { echo $k . $y . $sep; }
",
    )?;

    let results = Collector::new().analyze(&[temp.path().to_path_buf()]);
    let fixed = run_fix(&results, &apply_options(&temp), Vec::new())?;
    assert_eq!(fixed[0].rewritten, 2);

    assert_eq!(
        fs::read_to_string(temp.path().join("index.php"))?,
        "<?php
collect($a)->each(function($x)  {echo $x;});
echo 'between';
collect($b)->each(function($y, $k) use ($sep) {echo $k . $y . $sep;});
"
    );
    Ok(())
}

#[test]
fn test_rerun_after_fix_is_clean() -> Result<()> {
    let temp = tempdir()?;
    write(
        temp.path(),
        "index.php",
        "<?php
foreach ($groups as $group) {
    foreach ($group as $member) {
        foreach ($member->roles as $role) {
            echo $role;
        }
    }
}
",
    )?;

    let mut passes = 0;
    loop {
        let results = Collector::new().analyze(&[temp.path().to_path_buf()]);
        if results.problems.is_empty() {
            break;
        }
        run_fix(&results, &apply_options(&temp), Vec::new())?;
        passes += 1;
        assert!(passes <= 3, "fix did not converge");
    }

    assert_eq!(passes, 3);
    let content = fs::read_to_string(temp.path().join("index.php"))?;
    assert!(!content.contains("foreach"));
    Ok(())
}

#[test]
fn test_analyzer_honours_config_excludes() -> Result<()> {
    let temp = tempdir()?;
    write(
        temp.path(),
        ".collector.toml",
        "[collector]\nexclude_folders = [\"legacy\"]\n",
    )?;
    write(temp.path(), "legacy/old.php", "<?php foreach ($a as $b) { echo $b; }")?;
    write(temp.path(), "src/new.php", "<?php foreach ($a as $b) { echo $b; }")?;

    let config = Config::load_from_path(temp.path());
    let excludes = config.collector.exclude_folders.clone().unwrap_or_default();
    let collector = Collector::new().with_config(&config).with_excludes(excludes);

    let results = collector.analyze(&[temp.path().to_path_buf()]);
    assert_eq!(results.problems.len(), 1);
    assert!(results.problems[0].file.ends_with("src/new.php"));
    Ok(())
}

#[test]
fn test_suppressed_loop_is_not_fixed() -> Result<()> {
    let temp = tempdir()?;
    let source = "<?php
// collector-ignore
foreach ($a as $b) { echo $b; }
";
    write(temp.path(), "index.php", source)?;

    let results = Collector::new().analyze(&[temp.path().to_path_buf()]);
    assert!(results.problems.is_empty());

    let fixed = run_fix(&results, &apply_options(&temp), Vec::new())?;
    assert!(fixed.is_empty());
    assert_eq!(fs::read_to_string(temp.path().join("index.php"))?, source);
    Ok(())
}
