// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn writes_an_image_of_the_requested_size() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("mandel.png");
    Command::cargo_bin("mandel")
        .unwrap()
        .arg("-o")
        .arg(&out)
        .args(&["-s", "64x48", "-m", "smooth", "--threads", "3", "-i", "200"])
        .assert()
        .success();
    let img = image::open(&out).unwrap().to_rgb();
    assert_eq!(img.dimensions(), (64, 48));
}

#[test]
fn goto_and_zoom_show_up_in_the_request() {
    Command::cargo_bin("mandel")
        .unwrap()
        .args(&[
            "--dump-request",
            "-s",
            "101x51",
            "--center=-0.5,0.25",
            "--range",
            "2",
            "--zoom",
            "0.5",
            "-m",
            "rainbow",
            "--quick",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"min_re\": -1.0"))
        .stdout(predicate::str::contains("\"max_re\": 0.0"))
        .stdout(predicate::str::contains("\"mode\": \"Rainbow\""))
        .stdout(predicate::str::contains("\"quick\": true"))
        .stdout(predicate::str::contains("\"width\": 50"))
        .stdout(predicate::str::contains("\"height\": 25"));
}

#[test]
fn quick_previews_are_written_at_half_size() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("preview.png");
    Command::cargo_bin("mandel")
        .unwrap()
        .arg("-o")
        .arg(&out)
        .args(&["-s", "64x48", "--quick"])
        .assert()
        .success();
    let img = image::open(&out).unwrap().to_rgb();
    assert_eq!(img.dimensions(), (32, 24));
}

#[test]
fn refuses_oversized_images_before_allocating() {
    Command::cargo_bin("mandel")
        .unwrap()
        .args(&["-o", "never.png", "-s", "100000x100000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at most 10000 pixels"));
    Command::cargo_bin("mandel")
        .unwrap()
        .args(&["--dump-request", "-s", "10000x2"])
        .assert()
        .success();
}

#[test]
fn rejects_an_inverted_viewport() {
    let dir = tempdir().unwrap();
    Command::cargo_bin("mandel")
        .unwrap()
        .arg("-o")
        .arg(dir.path().join("never.png"))
        .args(&["-s", "16x16", "--leftlower=1,1", "--rightupper=-1,-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid viewport"));
}

#[test]
fn rejects_a_degenerate_size() {
    Command::cargo_bin("mandel")
        .unwrap()
        .args(&["-o", "never.png", "-s", "1x16"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid render size 1x16"));
}

#[test]
fn rejects_unknown_modes() {
    Command::cargo_bin("mandel")
        .unwrap()
        .args(&["-o", "never.png", "-m", "plaid"])
        .assert()
        .failure();
}
