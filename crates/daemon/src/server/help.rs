// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Embedded help page

use axum::extract::State;
use axum::response::Html;

use super::AppState;

const HELP_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8" />
    <meta name="description" content="Librarian" />
    <title>Librarian Help Page</title>
  </head>
  <body>
    <h2>Librarian help page for server currently running on {address}</h2>

    <p>Librarian coordinates label assignments among different clients. It allows
    check-in and check-out of (uuid, label) tuples given a client id. The client id
    is an arbitrary string without whitespace, e.g. a user name. Every check-in,
    check-out and reset is recorded in a human-readable librarian log file.</p>

    <h3>HTTP API</h3>
<pre>
 GET  /

    The current help page.

 GET  /uuids

    Returns a JSON array of the UUIDs with reservations since their last reset.

 GET  /state/{UUID}
 GET  /checkout/{UUID}

    Returns JSON describing all reserved labels for the given UUID:

    [
        { "Label": 1, "Client": "katzw" },
        { "Label": 2019, "Client": "zhaot" }
    ]

 GET  /history/{UUID}

    Returns the logged operations for the UUID, oldest first:

    [
        { "Time": "2024-01-01T00:00:00Z", "Op": "checkout", "Label": 1, "Client": "katzw" },
        { "Time": "2024-01-02T00:00:00Z", "Op": "reset" }
    ]

 GET  /checkout/{UUID}/{Label}

    Returns JSON for the client holding the given label of the UUID:

    { "Label": 34890, "Client": "katzw" }

    If no client holds the label, a 400 status is returned.

 PUT  /checkout/{UUID}/{Label}/{Client}
 PUT  /checkout/{UUID}    with body { "Label": 34890, "Client": "katzw" }

    Reserves a label of the UUID for the client. If that label is available,
    a 200 is returned. If another client holds it, a 409 (Conflict) is returned.

 PUT  /checkin/{UUID}/{Label}/{Client}

    Checks back in the given label of the UUID. The client id must match the one
    used to check out the label. Otherwise a 400 status is returned.

 PUT  /reset/{UUID}

    Resets all reservations made for the given UUID.
</pre>
  </body>
</html>
"#;

/// Render the help page for a server reachable at `address`
pub fn render(address: &str) -> String {
    HELP_TEMPLATE.replace("{address}", address)
}

pub async fn help_handler(State(state): State<AppState>) -> Html<String> {
    Html(render(state.address()))
}
