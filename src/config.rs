use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use config_file::FromConfigFile;
use serde::Deserialize;

use crate::effects::rain::RainParams;

#[derive(clap::ValueEnum, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Board {
    #[default]
    #[value(name = "8x8")]
    #[serde(rename = "8x8")]
    Board8x8,
    #[value(name = "16x16")]
    #[serde(rename = "16x16")]
    Board16x16,
}

impl Board {
    pub fn rain_params(self) -> RainParams {
        match self {
            Board::Board8x8 => RainParams::board_8x8(),
            Board::Board16x16 => RainParams::board_16x16(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "pixelrain", version, about = "Digital rain for LED matrices")]
pub struct Cli {
    /// TOML file with settings; flags given on the command line take precedence
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// LED board layout
    #[arg(short, long, value_enum)]
    pub board: Option<Board>,

    /// Animation ticks per second
    #[arg(long, value_name = "HZ")]
    pub tick_rate: Option<f32>,

    /// Display updates per second
    #[arg(long, value_name = "HZ")]
    pub refresh_rate: Option<f32>,

    /// Random seed, for reproducible rain
    #[arg(long)]
    pub seed: Option<u64>,

    /// Master brightness in percent
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub brightness: Option<u8>,

    /// Address of OLA's OSC plugin
    #[arg(long, value_name = "ADDR")]
    pub ola: Option<SocketAddr>,

    /// Do not send frames to OLA
    #[arg(long, conflicts_with = "ola")]
    pub no_ola: bool,

    /// Listen for OSC display controls on this address
    #[arg(long, value_name = "ADDR")]
    pub osc_listen: Option<SocketAddr>,

    /// Show the board in the terminal
    #[arg(short, long)]
    pub preview: bool,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub board: Board,
    pub tick_rate_hz: f32,
    pub refresh_rate_hz: f32,
    pub seed: Option<u64>,
    pub brightness: u8,
    pub ola_enabled: bool,
    pub ola_addr: SocketAddr,
    pub ola_universe: u32,
    pub osc_listen: Option<SocketAddr>,
    pub preview: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            board: Board::default(),
            tick_rate_hz: 200.0,
            refresh_rate_hz: 60.0,
            seed: None,
            brightness: 90,
            ola_enabled: true,
            ola_addr: SocketAddr::from(([127, 0, 0, 1], 7770)),
            ola_universe: 0,
            osc_listen: None,
            preview: false,
        }
    }
}

impl Config {
    /// Reads the config file named on the command line, if any, and applies
    /// the command line overrides.
    pub fn load(cli: &Cli) -> Result<Config, String> {
        let mut config = match &cli.config {
            Some(path) => Config::from_config_file(path)
                .map_err(|err| format!("Cannot read {}: {}", path.display(), err))?,
            None => Config::default(),
        };
        config.apply(cli);
        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, cli: &Cli) {
        if let Some(board) = cli.board {
            self.board = board;
        }
        if let Some(tick_rate) = cli.tick_rate {
            self.tick_rate_hz = tick_rate;
        }
        if let Some(refresh_rate) = cli.refresh_rate {
            self.refresh_rate_hz = refresh_rate;
        }
        if cli.seed.is_some() {
            self.seed = cli.seed;
        }
        if let Some(brightness) = cli.brightness {
            self.brightness = brightness;
        }
        if let Some(ola) = cli.ola {
            self.ola_addr = ola;
            self.ola_enabled = true;
        }
        if cli.no_ola {
            self.ola_enabled = false;
        }
        if cli.osc_listen.is_some() {
            self.osc_listen = cli.osc_listen;
        }
        self.preview |= cli.preview;
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, rate) in [
            ("tick rate", self.tick_rate_hz),
            ("refresh rate", self.refresh_rate_hz),
        ] {
            if !rate.is_finite() || rate <= 0.0 || rate > 1000.0 {
                return Err(format!("{} must be within (0, 1000] Hz, got {}", name, rate));
            }
        }
        if self.brightness > 100 {
            return Err(format!("brightness must be 0-100, got {}", self.brightness));
        }
        self.board.rain_params().validate()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pixelrain").chain(args.iter().copied())).unwrap()
    }

    fn write_config(name: &str, contents: &str) -> PathBuf {
        let file_name = format!("pixelrain-{}-{}.toml", name, std::process::id());
        let path = std::env::temp_dir().join(file_name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn defaults() {
        let config = Config::load(&cli(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.board, Board::Board8x8);
        assert_eq!(config.tick_rate_hz, 200.0);
        assert!(config.ola_enabled);
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::load(&cli(&[
            "--board",
            "16x16",
            "--seed",
            "9",
            "--brightness",
            "40",
            "--no-ola",
            "--preview",
        ]))
        .unwrap();
        assert_eq!(config.board, Board::Board16x16);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.brightness, 40);
        assert!(!config.ola_enabled);
        assert!(config.preview);
    }

    #[test]
    fn rejects_out_of_range_brightness_flag() {
        let args = ["pixelrain", "--brightness", "150"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn rejects_bad_rates() {
        assert!(Config::load(&cli(&["--tick-rate", "0"])).is_err());
        assert!(Config::load(&cli(&["--refresh-rate", "5000"])).is_err());
    }

    #[test]
    fn reads_file_and_lets_flags_win() {
        let path = write_config(
            "override",
            "board = \"16x16\"\nbrightness = 70\nola_addr = \"10.0.0.2:7770\"\nseed = 3\n",
        );
        let path_str = path.to_str().unwrap().to_string();

        let config = Config::load(&cli(&["--config", path_str.as_str(), "--seed", "4"])).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.board, Board::Board16x16);
        assert_eq!(config.brightness, 70);
        assert_eq!(config.ola_addr, SocketAddr::from(([10, 0, 0, 2], 7770)));
        assert_eq!(config.seed, Some(4));
        assert_eq!(config.refresh_rate_hz, 60.0);
    }

    #[test]
    fn unknown_keys_are_errors() {
        let path = write_config("unknown", "colour = \"red\"\n");
        let path_str = path.to_str().unwrap().to_string();

        let result = Config::load(&cli(&["--config", path_str.as_str()]));
        fs::remove_file(&path).unwrap();

        assert!(result.is_err());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = Config::load(&cli(&["--config", "/nonexistent/pixelrain.toml"])).unwrap_err();
        assert!(err.contains("/nonexistent/pixelrain.toml"), "{}", err);
    }
}
