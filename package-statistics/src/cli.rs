// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {
    clap::{Arg, ArgMatches, Command},
    debian_package_stats::{
        catalog::ContentsVariant,
        error::PackageStatsError,
        ranking::RankedEntry,
        stats::{PackageStats, DEFAULT_MIRROR_URL},
    },
    log::LevelFilter,
    thiserror::Error,
};

const ABOUT: &str = "\
Output the statistics of the top 10 packages with the most files associated
with them for a particular system architecture.

The `Contents` index for the architecture is downloaded from a Debian mirror,
decompressed and analyzed. Each line of the index associates a file path with
one or more packages. Packages are ranked by the number of files they own.

The mirror location is a directory holding `Contents-<arch>.gz` files, such as
`dists/<distribution>/<component>/` of a Debian archive. If the value contains
`://`, it will be parsed as a URL (`http://`, `https://` and `file://` are
recognized). Otherwise it will be interpreted as a local filesystem path.
";

#[derive(Debug, Error)]
pub enum StatsCliError {
    #[error("argument parsing error: {0}")]
    Clap(#[from] clap::Error),

    #[error("{0}")]
    Stats(#[from] PackageStatsError),
}

pub type Result<T> = std::result::Result<T, StatsCliError>;

fn app() -> Command<'static> {
    Command::new("package_statistics")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Gregory Szorc <gregory.szorc@gmail.com>")
        .about("Report Debian packages having the most files")
        .long_about(ABOUT)
        .arg(
            Arg::new("arch")
                .required_unless_present("list-archs")
                .help("Architecture whose contents are to be downloaded and analyzed"),
        )
        .arg(
            Arg::new("mirror")
                .long("mirror")
                .takes_value(true)
                .default_value(DEFAULT_MIRROR_URL)
                .help("URL or path of the mirror directory holding Contents indices"),
        )
        .arg(
            Arg::new("count")
                .short('n')
                .long("count")
                .takes_value(true)
                .default_value("10")
                .help("Number of packages to display"),
        )
        .arg(
            Arg::new("udeb")
                .long("udeb")
                .help("Analyze the index of installer (udeb) packages"),
        )
        .arg(
            Arg::new("list-archs")
                .long("list-archs")
                .help("Print the architectures advertised by the mirror and exit"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .multiple_occurrences(true)
                .help("Increase logging verbosity. Can be specified multiple times"),
        )
}

fn init_logging(matches: &ArgMatches) {
    let log_level = match matches.occurrences_of("verbose") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level.as_str()),
    );

    // Disable log context except at higher log levels.
    if log_level <= LevelFilter::Info {
        builder
            .format_timestamp(None)
            .format_level(false)
            .format_target(false);
    }

    // rustls spews unwanted output below trace level.
    if log_level <= LevelFilter::Debug {
        builder.filter_module("rustls", LevelFilter::Error);
    }

    builder.init();
}

/// Render ranked packages as a table.
fn format_table(entries: &[RankedEntry]) -> String {
    let mut out = format!("\n{:>2}  {:>30}\t{}\n\n", "#", "Package", "File Count");

    for (index, entry) in entries.iter().enumerate() {
        out.push_str(&format!(
            "{:>2}. {:>30}\t{:>5} files\n",
            index + 1,
            entry.package,
            entry.count
        ));
    }

    out
}

pub async fn run_cli() -> Result<()> {
    let matches = app().get_matches();

    init_logging(&matches);

    let mirror = matches
        .value_of("mirror")
        .expect("mirror argument has a default value");

    let stats = PackageStats::from_location(mirror).await?;

    if matches.is_present("list-archs") {
        for arch in stats.get_archs() {
            println!("{}", arch);
        }

        return Ok(());
    }

    let arch = matches
        .value_of("arch")
        .expect("arch argument is required without --list-archs");
    let count = matches.value_of_t::<usize>("count")?;
    let variant = if matches.is_present("udeb") {
        ContentsVariant::Udeb
    } else {
        ContentsVariant::Primary
    };

    let entries = stats
        .get_package_stats_variant(arch, variant, count)
        .await?;

    print!("{}", format_table(&entries));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_app() {
        app().debug_assert();
    }

    #[test]
    fn arguments() -> Result<()> {
        let matches = app().try_get_matches_from(["package_statistics", "amd64"])?;
        assert_eq!(matches.value_of("arch"), Some("amd64"));
        assert_eq!(matches.value_of("mirror"), Some(DEFAULT_MIRROR_URL));
        assert_eq!(matches.value_of_t::<usize>("count")?, 10);
        assert!(!matches.is_present("udeb"));

        let matches = app().try_get_matches_from([
            "package_statistics",
            "--mirror",
            "/srv/mirror",
            "--udeb",
            "-n",
            "3",
            "-vv",
            "arm64",
        ])?;
        assert_eq!(matches.value_of("arch"), Some("arm64"));
        assert_eq!(matches.value_of("mirror"), Some("/srv/mirror"));
        assert_eq!(matches.value_of_t::<usize>("count")?, 3);
        assert!(matches.is_present("udeb"));
        assert_eq!(matches.occurrences_of("verbose"), 2);

        let matches = app().try_get_matches_from(["package_statistics", "--list-archs"])?;
        assert!(matches.is_present("list-archs"));
        assert_eq!(matches.value_of("arch"), None);

        Ok(())
    }

    #[test]
    fn arch_required() {
        assert!(app().try_get_matches_from(["package_statistics"]).is_err());
    }

    #[test]
    fn table() {
        let table = format_table(&[
            RankedEntry {
                package: "piglit".to_string(),
                count: 53007,
            },
            RankedEntry {
                package: "esys-particle".to_string(),
                count: 18408,
            },
        ]);

        let lines = table.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "");
        assert_eq!(
            lines[1],
            format!(" #  {:>30}\tFile Count", "Package")
        );
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], format!(" 1. {:>30}\t53007 files", "piglit"));
        assert_eq!(lines[4], format!(" 2. {:>30}\t18408 files", "esys-particle"));
        assert_eq!(lines.len(), 5);
    }
}
