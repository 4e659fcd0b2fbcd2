//! Display-name resolution for hwmon devices.
//!
//! The kernel names hwmon chips after their driver (`coretemp`, `it87`,
//! `nvme`, `amdgpu`...). Each resolver below maps one family of drivers to a
//! friendlier name using another platform source; the first one that answers
//! wins and the raw name is kept when none does.

use crate::config::PlatformPaths;
use crate::platform::PlatformProvider;
use log::{debug, warn};
use std::path::Path;
use std::time::Duration;

/// Substrings of motherboard Super I/O and WMI driver names
pub const MOTHERBOARD_DRIVERS: [&str; 4] = ["gigabyte_wmi", "it87", "it86", "thinkpad-isa"];

/// Exact names of CPU package temperature drivers
pub const CPU_DRIVERS: [&str; 2] = ["k10temp", "coretemp"];

const RENDERER_PREFIX: &str = "OpenGL renderer string:";

/// Everything a resolver may consult about one device container
pub struct NameContext<'a> {
    pub platform: &'a dyn PlatformProvider,
    pub paths: &'a PlatformPaths,
    /// The `hwmonN` directory
    pub container: &'a Path,
    pub command_timeout: Duration,
}

pub type NameResolver = fn(&NameContext<'_>, &str) -> Option<String>;

/// Resolvers in priority order
pub const DEFAULT_RESOLVERS: [(&str, NameResolver); 4] = [
    ("motherboard", motherboard_name as NameResolver),
    ("cpu", cpu_model_name as NameResolver),
    ("nvme", nvme_model_name as NameResolver),
    ("gpu", gpu_renderer_name as NameResolver),
];

pub fn resolve_display_name(ctx: &NameContext<'_>, raw_name: &str) -> String {
    resolve_with(&DEFAULT_RESOLVERS, ctx, raw_name)
}

/// Run `resolvers` in order; the raw name stands when none matches
pub fn resolve_with(resolvers: &[(&str, NameResolver)], ctx: &NameContext<'_>, raw_name: &str) -> String {
    for (heuristic, resolve) in resolvers {
        if let Some(display) = resolve(ctx, raw_name) {
            debug!("{}: named {:?} by {} heuristic", raw_name, display, heuristic);
            return display;
        }
    }
    raw_name.to_string()
}

/// `"{board vendor} {board name}"` from DMI for motherboard sensor chips
pub fn motherboard_name(ctx: &NameContext<'_>, raw_name: &str) -> Option<String> {
    if !MOTHERBOARD_DRIVERS.iter().any(|driver| raw_name.contains(driver)) {
        return None;
    }

    let vendor = ctx.platform.read_text(&ctx.paths.board_vendor);
    let board = ctx.platform.read_text(&ctx.paths.board_name);
    match (vendor, board) {
        (Ok(vendor), Ok(board)) => Some(format!("{} {}", vendor, board)),
        (Err(e), _) | (_, Err(e)) => {
            warn!("{}: DMI board identity unreadable: {}", raw_name, e);
            None
        }
    }
}

/// CPU model string for CPU package temperature drivers
pub fn cpu_model_name(ctx: &NameContext<'_>, raw_name: &str) -> Option<String> {
    if !CPU_DRIVERS.contains(&raw_name) {
        return None;
    }

    let model = ctx.platform.cpu_model(&ctx.paths.cpuinfo);
    if model.is_none() {
        debug!("{}: no model name in {}", raw_name, ctx.paths.cpuinfo.display());
    }
    model
}

/// Drive model for NVMe controllers, from `<container>/device/model`
pub fn nvme_model_name(ctx: &NameContext<'_>, raw_name: &str) -> Option<String> {
    if !raw_name.contains("nvme") {
        return None;
    }

    ctx.platform
        .read_text(&ctx.container.join("device").join("model"))
        .ok()
        .filter(|model| !model.is_empty())
}

/// OpenGL renderer string reported by `glxinfo -B`
pub fn gpu_renderer_name(ctx: &NameContext<'_>, raw_name: &str) -> Option<String> {
    if !raw_name.contains("gpu") {
        return None;
    }

    let output = match ctx.platform.run_command("glxinfo", &["-B"], ctx.command_timeout) {
        Ok(output) => output,
        Err(e) => {
            debug!("{}: glxinfo unavailable: {}", raw_name, e);
            return None;
        }
    };

    renderer_from_glxinfo(&output)
}

/// Value of the `OpenGL renderer string:` line
pub fn renderer_from_glxinfo(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with(RENDERER_PREFIX))
        .and_then(|line| line.split_once(':'))
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakePlatform, FakeSysfs};

    const GLXINFO: &str = "name of display: :0\n\
        display: :0  screen: 0\n\
        Extended renderer info (GLX_MESA_query_renderer):\n    \
            Vendor: AMD (0x1002)\n\
        OpenGL vendor string: AMD\n\
        OpenGL renderer string: AMD Radeon RX 6800 XT (radeonsi, navi21, LLVM 15.0.7, DRM 3.49)\n";

    fn resolve(sysfs: &FakeSysfs, platform: &FakePlatform, container: &str, raw: &str) -> String {
        let paths = sysfs.paths();
        let container = paths.hwmon_root.join(container);
        let ctx = NameContext {
            platform,
            paths: &paths,
            container: &container,
            command_timeout: Duration::from_secs(1),
        };
        resolve_display_name(&ctx, raw)
    }

    #[test]
    fn test_motherboard_uses_dmi() {
        let sysfs = FakeSysfs::new();
        sysfs
            .write("class/dmi/id/board_vendor", "Gigabyte Technology Co., Ltd.\n")
            .write("class/dmi/id/board_name", "B550 AORUS ELITE\n");

        let name = resolve(&sysfs, &FakePlatform::new(), "hwmon3", "gigabyte_wmi");
        assert_eq!(name, "Gigabyte Technology Co., Ltd. B550 AORUS ELITE");
    }

    #[test]
    fn test_motherboard_substring_match() {
        let sysfs = FakeSysfs::new();
        sysfs
            .write("class/dmi/id/board_vendor", "ASRock")
            .write("class/dmi/id/board_name", "X570 Taichi");

        assert_eq!(resolve(&sysfs, &FakePlatform::new(), "hwmon2", "it8792"), "ASRock X570 Taichi");
        assert_eq!(resolve(&sysfs, &FakePlatform::new(), "hwmon2", "nct6798"), "nct6798");
    }

    #[test]
    fn test_motherboard_missing_dmi_keeps_raw_name() {
        let sysfs = FakeSysfs::new();
        sysfs.write("class/dmi/id/board_vendor", "LENOVO");

        assert_eq!(resolve(&sysfs, &FakePlatform::new(), "hwmon4", "thinkpad-isa-0000"), "thinkpad-isa-0000");
    }

    #[test]
    fn test_cpu_exact_match_only() {
        let sysfs = FakeSysfs::new();
        sysfs.write("proc/cpuinfo", "processor\t: 0\nmodel name\t: Intel(R) Core(TM) i7-8550U CPU @ 1.80GHz\n");

        let platform = FakePlatform::new();
        assert_eq!(
            resolve(&sysfs, &platform, "hwmon1", "coretemp"),
            "Intel(R) Core(TM) i7-8550U CPU @ 1.80GHz"
        );
        assert_eq!(resolve(&sysfs, &platform, "hwmon1", "coretemp2"), "coretemp2");
    }

    #[test]
    fn test_cpu_without_cpuinfo_keeps_raw_name() {
        let sysfs = FakeSysfs::new();
        assert_eq!(resolve(&sysfs, &FakePlatform::new(), "hwmon1", "k10temp"), "k10temp");
    }

    #[test]
    fn test_nvme_model() {
        let sysfs = FakeSysfs::new();
        sysfs.hwmon("hwmon5", "device/model", "Samsung SSD 970 EVO Plus 1TB          \n");

        assert_eq!(
            resolve(&sysfs, &FakePlatform::new(), "hwmon5", "nvme"),
            "Samsung SSD 970 EVO Plus 1TB"
        );
        assert_eq!(resolve(&sysfs, &FakePlatform::new(), "hwmon6", "nvme"), "nvme");
    }

    #[test]
    fn test_gpu_renderer_string() {
        let sysfs = FakeSysfs::new();
        let platform = FakePlatform::new().with_output("glxinfo -B", GLXINFO);

        assert_eq!(
            resolve(&sysfs, &platform, "hwmon2", "amdgpu"),
            "AMD Radeon RX 6800 XT (radeonsi, navi21, LLVM 15.0.7, DRM 3.49)"
        );
        assert_eq!(platform.calls(), vec!["glxinfo -B".to_string()]);
    }

    #[test]
    fn test_gpu_command_failure_keeps_raw_name() {
        let sysfs = FakeSysfs::new();
        let failing = FakePlatform::new().with_failure("glxinfo -B");
        assert_eq!(resolve(&sysfs, &failing, "hwmon2", "amdgpu"), "amdgpu");

        let no_line = FakePlatform::new().with_output("glxinfo -B", "name of display: :0\n");
        assert_eq!(resolve(&sysfs, &no_line, "hwmon2", "amdgpu"), "amdgpu");
    }

    #[test]
    fn test_unmatched_name_skips_all_sources() {
        let sysfs = FakeSysfs::new();
        let platform = FakePlatform::new();

        assert_eq!(resolve(&sysfs, &platform, "hwmon0", "acpitz"), "acpitz");
        assert!(platform.calls().is_empty());
        assert_eq!(platform.reads(), 0);
    }

    #[test]
    fn test_custom_resolver_order() {
        fn always(_: &NameContext<'_>, raw: &str) -> Option<String> {
            Some(format!("custom {}", raw))
        }

        let sysfs = FakeSysfs::new();
        let platform = FakePlatform::new();
        let paths = sysfs.paths();
        let container = paths.hwmon_root.join("hwmon0");
        let ctx = NameContext {
            platform: &platform,
            paths: &paths,
            container: &container,
            command_timeout: Duration::from_secs(1),
        };

        let resolvers: [(&str, NameResolver); 2] = [
            ("custom", always as NameResolver),
            ("cpu", cpu_model_name as NameResolver),
        ];
        assert_eq!(resolve_with(&resolvers, &ctx, "coretemp"), "custom coretemp");
    }
}
