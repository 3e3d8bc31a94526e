// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.


pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while setting up logging.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Logging configuration error: {0}")]
    LoggingConfiguration(String),
    #[error("I/O error while setting up logging: {0}")]
    Io(#[from] std::io::Error),
}
