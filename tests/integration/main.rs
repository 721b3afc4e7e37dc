//! Integration tests for Camara

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::path::{Path, PathBuf};
    use std::thread;
    use tempfile::TempDir;

    /// Isolated config file and data directory
    struct Sandbox {
        dir: TempDir,
    }

    impl Sandbox {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        fn with_config(content: &str) -> Self {
            let sandbox = Self::new();
            std::fs::write(sandbox.config_path(), content).unwrap();
            sandbox
        }

        fn config_path(&self) -> PathBuf {
            self.dir.path().join("config.toml")
        }

        fn data_dir(&self) -> PathBuf {
            self.dir.path().join("data")
        }

        fn path(&self) -> &Path {
            self.dir.path()
        }

        fn camara(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("camara");
            cmd.env_remove("RUST_LOG")
                .env_remove("CAMARA_CONFIG")
                .env_remove("CAMARA_DATA_DIR")
                .arg("--config")
                .arg(self.config_path())
                .arg("--data-dir")
                .arg(self.data_dir());
            cmd
        }
    }

    /// Serve `index.html`, `app.js` and `manifest.json` for `connections`
    /// requests, then stop listening
    fn serve_app(connections: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let origin = format!("http://{}/", listener.local_addr().unwrap());

        thread::spawn(move || {
            for stream in listener.incoming().take(connections) {
                let Ok(mut stream) = stream else { continue };
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let head = String::from_utf8_lossy(&request);
                let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                let (status, body) = match path.as_str() {
                    "/" | "/index.html" => ("200 OK", "<html>camara shell</html>"),
                    "/app.js" => ("200 OK", "console.log('camara')"),
                    "/manifest.json" => ("200 OK", "{\"name\":\"camara\"}"),
                    _ => ("404 Not Found", "missing"),
                };
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });

        origin
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("camara")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("offline-first camera"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("camara")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("camara"));
    }

    #[test]
    fn completions_generate() {
        cargo_bin_cmd!("camara")
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("camara"));
    }

    #[test]
    fn config_path() {
        let sandbox = Sandbox::new();
        sandbox
            .camara()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let sandbox = Sandbox::new();
        sandbox
            .camara()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[offline]"))
            .stdout(predicate::str::contains("pwa-camara-v1"));
    }

    #[test]
    fn config_init_then_refuses_overwrite() {
        let sandbox = Sandbox::new();
        sandbox
            .camara()
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration initialized"));
        assert!(sandbox.config_path().exists());

        sandbox
            .camara()
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--force"));
    }

    #[test]
    fn invalid_config_is_reported() {
        let sandbox = Sandbox::with_config("[camera]\nfacing = \"sideways\"\n");
        sandbox
            .camara()
            .args(["gallery", "list"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn gallery_list_empty() {
        let sandbox = Sandbox::new();
        sandbox
            .camara()
            .args(["gallery", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No photos yet"));
    }

    #[test]
    fn download_without_photos_fails() {
        let sandbox = Sandbox::new();
        sandbox
            .camara()
            .args(["download"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No photos"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn capture_then_list_and_show() {
        let sandbox = Sandbox::new();
        sandbox
            .camara()
            .args(["capture", "--facing", "back"])
            .assert()
            .success()
            .stdout(predicate::str::contains("captured"))
            .stdout(predicate::str::contains("320x240"));

        sandbox
            .camara()
            .args(["capture", "--facing", "front"])
            .assert()
            .success();

        sandbox
            .camara()
            .args(["gallery", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Total: 2 photo(s)"));

        sandbox
            .camara()
            .args(["gallery", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[2/2]"))
            .stdout(predicate::str::contains("newest"));

        sandbox
            .camara()
            .args(["gallery", "show", "--back", "5"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[1/2]"))
            .stdout(predicate::str::contains("oldest"));
    }

    #[test]
    fn capture_from_image_source_and_download() {
        let sandbox = Sandbox::new();
        let feed = sandbox.path().join("feed.png");
        image::RgbaImage::from_pixel(64, 48, image::Rgba([10, 20, 30, 255]))
            .save(&feed)
            .unwrap();
        let out = sandbox.path().join("out");

        sandbox
            .camara()
            .arg("capture")
            .arg("--source")
            .arg(&feed)
            .arg("--download")
            .arg("--output")
            .arg(&out)
            .assert()
            .success()
            .stdout(predicate::str::contains("64x48"));

        let files: Vec<_> = std::fs::read_dir(&out)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(files.len(), 1);
        assert!(files[0].starts_with("foto-") && files[0].ends_with("Z.png"));

        let saved = image::open(out.join(&files[0])).unwrap().to_rgba8();
        assert_eq!(saved.dimensions(), (64, 48));
        assert_eq!(saved.get_pixel(3, 3).0, [10, 20, 30, 255]);
    }

    #[test]
    fn capture_from_missing_source_fails() {
        let sandbox = Sandbox::new();
        sandbox
            .camara()
            .args(["capture", "--source"])
            .arg(sandbox.path().join("no-such-feed.png"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Camera device unavailable"));

        sandbox
            .camara()
            .args(["gallery", "list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());
    }

    #[test]
    fn download_writes_newest_photo() {
        let sandbox = Sandbox::new();
        sandbox.camara().arg("capture").assert().success();

        let out = sandbox.path().join("downloads");
        sandbox
            .camara()
            .arg("download")
            .arg("--output")
            .arg(&out)
            .assert()
            .success()
            .stdout(predicate::str::contains("foto-"));
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 1);
    }

    #[test]
    fn gallery_clear_requires_confirmation() {
        let sandbox = Sandbox::new();
        sandbox.camara().arg("capture").assert().success();

        // Non-interactive sessions answer "no"
        sandbox
            .camara()
            .args(["gallery", "clear"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Aborted"));

        sandbox
            .camara()
            .args(["gallery", "clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Deleted 1 photo(s)"));

        sandbox
            .camara()
            .args(["gallery", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No photos yet"));
    }

    #[test]
    fn cache_status_empty() {
        let sandbox = Sandbox::new();
        sandbox
            .camara()
            .args(["cache", "status"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cache generations"));
    }

    #[test]
    fn cache_install_offline_fails() {
        let sandbox = Sandbox::with_config("[offline]\norigin = \"http://127.0.0.1:9/\"\n");
        sandbox
            .camara()
            .args(["cache", "install"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Network unavailable"));

        sandbox
            .camara()
            .args(["cache", "status", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());
    }

    #[test]
    fn cache_serves_shell_once_offline() {
        // Four manifest assets, then the origin goes away
        let origin = serve_app(4);
        let sandbox = Sandbox::with_config(&format!("[offline]\norigin = \"{origin}\"\n"));

        sandbox
            .camara()
            .args(["cache", "install"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Installed 4 asset(s)"));

        sandbox
            .camara()
            .args(["cache", "activate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("now serving requests"));

        sandbox
            .camara()
            .args(["cache", "fetch", "./app.js"])
            .assert()
            .success()
            .stdout(predicate::str::contains("console.log('camara')"))
            .stderr(predicate::str::contains("cache"));

        sandbox
            .camara()
            .args(["cache", "fetch", "./gallery/42", "--document"])
            .assert()
            .success()
            .stdout(predicate::str::contains("camara shell"))
            .stderr(predicate::str::contains("fallback"));

        sandbox
            .camara()
            .args(["cache", "fetch", "./api/photos.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Network unavailable"));
    }
}
