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

mod common;

use common::{connector, root_config, sudo_config, FakeHost, PRIMING};
use unixprov::{ConnectorError, ObjectClass, Uid};

#[tokio::test]
async fn test_delete_account() {
    let host = FakeHost::new().reply("getent passwd svc1", "svc1:x:1001:1001::/home/svc1:/bin/bash\n");
    let mut connector = connector(sudo_config(), &host);

    connector
        .delete(&ObjectClass::Account, &Uid::new("svc1"))
        .await
        .unwrap();

    let commands = host.commands();
    assert_eq!(commands.len(), 2);
    assert_eq!(commands[0], "getent passwd svc1");
    assert_eq!(
        commands[1],
        format!("sudo -k; {PRIMING}; sudo userdel svc1; sudo rm -f /etc/sudoers.d/svc1_user")
    );
}

#[tokio::test]
async fn test_delete_account_removing_home() {
    let host = FakeHost::new().reply("getent passwd svc1", "svc1:x:1001:1001::/home/svc1:/bin/bash\n");
    let mut config = root_config();
    config.accounts.delete_home_directory = true;
    let mut connector = connector(config, &host);

    connector
        .delete(&ObjectClass::Account, &Uid::new("svc1"))
        .await
        .unwrap();

    assert_eq!(
        host.commands()[1],
        "userdel -r svc1; rm -f /etc/sudoers.d/svc1_user"
    );
}

#[tokio::test]
async fn test_delete_unknown_target() {
    let host = FakeHost::new();
    let mut connector = connector(root_config(), &host);

    let err = connector
        .delete(&ObjectClass::Group, &Uid::new("ghosts"))
        .await
        .unwrap_err();

    assert!(matches!(err, ConnectorError::UnknownUid(uid) if uid == "ghosts"));
    // Only the lookup went out.
    assert_eq!(host.commands(), vec!["getent group ghosts"]);
}

#[tokio::test]
async fn test_delete_group() {
    let host = FakeHost::new().reply("getent group ops", "ops:x:2000:svc1\n");
    let mut connector = connector(root_config(), &host);

    connector
        .delete(&ObjectClass::Group, &Uid::new("ops"))
        .await
        .unwrap();

    assert_eq!(
        host.commands()[1],
        "groupdel ops; rm -f /etc/sudoers.d/ops_group"
    );
}

#[tokio::test]
async fn test_delete_primary_group_of_existing_user_fails() {
    let host = FakeHost::new()
        .reply("getent group svc1", "svc1:x:1001:\n")
        .reply(
            "groupdel",
            "groupdel: cannot remove the primary group of user 'svc1'\n",
        );
    let mut connector = connector(root_config(), &host);

    let err = connector
        .delete(&ObjectClass::Group, &Uid::new("svc1"))
        .await
        .unwrap_err();

    match err {
        ConnectorError::CommandFailed { message, output } => {
            assert_eq!(message, "Could not delete group");
            assert!(output.contains("primary group"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_requires_identifier() {
    let host = FakeHost::new();
    let mut connector = connector(root_config(), &host);

    let err = connector
        .delete(&ObjectClass::Account, &Uid::new("  "))
        .await
        .unwrap_err();

    assert!(matches!(err, ConnectorError::InvalidArgument(_)));
    assert!(host.sent().is_empty());
}
