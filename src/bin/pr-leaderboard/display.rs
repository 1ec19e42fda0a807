use std::io::Write;

use anyhow::Result;
use pr_leaderboard::{Counter, Login, ReviewBuckets, ReviewCounts, Tallies};

const MERGE_HEADER: &str = "=== Contributor Leaderboard ===";
const REVIEW_HEADER: &str = "=== Review Leaderboard ===";
const EMPTY_NOTICE: &str = "No contributors found.";

fn write_leaderboard<W, C, F>(
    header: &str,
    tallies: &Tallies<C>,
    writer: &mut W,
    line: F,
) -> Result<()>
where
    W: Write,
    C: Counter,
    F: Fn(&Login, &C) -> String,
{
    writeln!(writer)?;
    writeln!(writer, "{header}")?;
    if tallies.is_empty() {
        writeln!(writer, "{EMPTY_NOTICE}")?;
        return Ok(());
    }
    for (login, counter) in tallies.ranked() {
        writeln!(writer, "{}", line(login, counter))?;
    }
    Ok(())
}

pub fn write_merge_leaderboard<W: Write>(tallies: &Tallies<u64>, writer: &mut W) -> Result<()> {
    write_leaderboard(MERGE_HEADER, tallies, writer, |login, count| {
        format!("{login}: {count} merged PRs")
    })
}

pub fn write_review_leaderboard<W: Write>(
    tallies: &Tallies<ReviewCounts>,
    buckets: ReviewBuckets,
    writer: &mut W,
) -> Result<()> {
    write_leaderboard(REVIEW_HEADER, tallies, writer, |login, counts| {
        let total = counts.total();
        match buckets {
            ReviewBuckets::ThreeWay => format!(
                "{login}: {total} reviews (Approvals: {}, Comments: {}, Changes Requested: {})",
                counts.approvals, counts.comments, counts.changes_requested
            ),
            ReviewBuckets::TwoWay => format!(
                "{login}: {total} reviews (Approvals: {}, Comments: {})",
                counts.approvals, counts.comments
            ),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login(s: &str) -> Login {
        Login::new(s).unwrap()
    }

    fn render<F: FnOnce(&mut Vec<u8>) -> Result<()>>(f: F) -> String {
        let mut output = Vec::new();
        f(&mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_merge_leaderboard_is_ranked() {
        let mut tallies: Tallies<u64> = Tallies::new();
        *tallies.entry(login("bob")) += 1;
        *tallies.entry(login("alice")) += 3;
        *tallies.entry(login("carol")) += 1;

        let result = render(|out| write_merge_leaderboard(&tallies, out));
        assert_eq!(
            result,
            "\n=== Contributor Leaderboard ===\n\
             alice: 3 merged PRs\n\
             bob: 1 merged PRs\n\
             carol: 1 merged PRs\n"
        );
    }

    #[test]
    fn test_review_leaderboard_three_way() {
        let mut tallies: Tallies<ReviewCounts> = Tallies::new();
        *tallies.entry(login("alice")) += ReviewCounts {
            approvals: 1,
            comments: 0,
            changes_requested: 1,
        };
        *tallies.entry(login("bob")) += ReviewCounts {
            approvals: 0,
            comments: 1,
            changes_requested: 0,
        };

        let result = render(|out| write_review_leaderboard(&tallies, ReviewBuckets::ThreeWay, out));
        assert_eq!(
            result,
            "\n=== Review Leaderboard ===\n\
             alice: 2 reviews (Approvals: 1, Comments: 0, Changes Requested: 1)\n\
             bob: 1 reviews (Approvals: 0, Comments: 1, Changes Requested: 0)\n"
        );
    }

    #[test]
    fn test_review_leaderboard_two_way_hides_changes_requested() {
        let mut tallies: Tallies<ReviewCounts> = Tallies::new();
        *tallies.entry(login("dave")) += ReviewCounts {
            approvals: 2,
            comments: 5,
            changes_requested: 0,
        };

        let result = render(|out| write_review_leaderboard(&tallies, ReviewBuckets::TwoWay, out));
        assert!(result.contains("dave: 7 reviews (Approvals: 2, Comments: 5)"));
        assert!(!result.contains("Changes Requested"));
    }

    #[test]
    fn test_empty_leaderboard() {
        let tallies: Tallies<u64> = Tallies::new();

        let result = render(|out| write_merge_leaderboard(&tallies, out));
        assert!(result.contains("=== Contributor Leaderboard ==="));
        assert!(result.contains("No contributors found."));
    }
}
