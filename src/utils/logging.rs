// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use tracing_subscriber::EnvFilter;

/// Filter directives for a `-v` count.
fn directives(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "unixprov=warn",
        1 => "unixprov=info",
        // -vv adds the transport's handshake and channel logs
        2 => "unixprov=debug,russh=debug",
        _ => "unixprov=trace,russh=trace",
    }
}

/// `RUST_LOG` when set, otherwise the directives for `verbosity`.
pub fn create_env_filter(verbosity: u8) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(directives(verbosity))
    }
}

/// Initialize console logging on stderr so stdout stays parseable.
pub fn init_logging(verbosity: u8) {
    let filter = create_env_filter(verbosity);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives_by_verbosity() {
        assert_eq!(directives(0), "unixprov=warn");
        assert!(!directives(1).contains("russh"));
        assert!(directives(2).contains("russh=debug"));
        assert_eq!(directives(7), directives(3));
    }
}
