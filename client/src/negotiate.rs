// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Version selection against the controller's HELLO.

use crate::events::CloseReason;
use ofagent_messages::message::version;
use ofagent_messages::message::Hello;

/// Decide which protocol version the connection will run, from our
/// supported set (`ours`, ascending and unique) and the controller's
/// HELLO.
///
/// When our highest version understands HELLO elements, the controller's
/// set is its advertised version bitmap -- or just its header version when
/// no bitmap was sent -- and the result is the greatest version common to
/// both sets. Below that, elements do not exist and the controller's
/// header version is simply accepted if we support it.
pub(crate) fn decide_on_version(
    ours: &[u8],
    hello: &Hello,
    hello_version: u8,
) -> Result<u8, CloseReason> {
    let Some(&highest) = ours.last() else {
        return Err(CloseReason::UnsupportedVersion(hello_version));
    };
    if highest >= version::V4 {
        if highest == hello_version {
            return Ok(highest);
        }
        let theirs = hello
            .version_bitmap()
            .map(<[u8]>::to_vec)
            .unwrap_or_else(|| vec![hello_version]);
        greatest_common(ours, &theirs).ok_or_else(|| CloseReason::NoCommonVersion {
            client: ours.to_vec(),
            server: theirs,
        })
    } else if ours.contains(&hello_version) {
        Ok(hello_version)
    } else {
        Err(CloseReason::UnsupportedVersion(hello_version))
    }
}

// Greatest element common to two ascending sorted sets: walk both from
// the high end, advancing whichever side is larger.
fn greatest_common(ours: &[u8], theirs: &[u8]) -> Option<u8> {
    let (mut i, mut j) = (ours.len(), theirs.len());
    while i > 0 && j > 0 {
        let (a, b) = (ours[i - 1], theirs[j - 1]);
        if a == b {
            return Some(a);
        }
        if a > b {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    None
}
