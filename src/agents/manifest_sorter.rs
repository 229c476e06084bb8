use crate::error::{GomodError, Result};
use crate::gomod::{Manifest, RequireStmt};
use std::fs;
use std::path::Path;
use tracing::debug;

/// ManifestSorter regroups require statements: one statement for direct
/// dependencies followed by one for indirect ones, each keeping the
/// relative order the requirements had in the file.
pub struct ManifestSorter;

impl ManifestSorter {
    /// Regroup the requirements of `manifest` in memory.
    pub fn regroup(manifest: &mut Manifest) {
        let mut openings = manifest.require_opening_comments().into_iter();
        let opening = openings.next();
        // Only one comment fits on a `require (` line; the rest move down.
        let mut trailing: Vec<String> = openings.collect();
        trailing.extend(manifest.require_trailing_comments());

        let (direct, indirect): (Vec<_>, Vec<_>) = manifest
            .require_lines()
            .into_iter()
            .partition(|line| !line.requirement.indirect);

        let mut direct = RequireStmt::new(direct);
        let mut indirect = RequireStmt::new(indirect);
        if indirect.lines.is_empty() {
            direct.trailing = trailing;
        } else {
            indirect.trailing = trailing;
        }
        if direct.lines.is_empty() && !indirect.lines.is_empty() {
            indirect.opening = opening;
        } else {
            direct.opening = opening;
        }

        debug!(
            manifest = manifest.file(),
            direct = direct.lines.len(),
            indirect = indirect.lines.len(),
            "regrouping requirements"
        );

        manifest.replace_requires(vec![direct, indirect]);
        manifest.cleanup();
    }

    /// Regroup and overwrite the manifest at `path`, keeping its permissions.
    pub fn sort_file(path: &Path, manifest: &mut Manifest) -> Result<()> {
        Self::regroup(manifest);

        let bytes = manifest.format()?;

        let metadata = fs::metadata(path).map_err(|e| GomodError::io("stat gomod", e))?;
        fs::write(path, &bytes).map_err(|e| GomodError::io("write gomod", e))?;
        fs::set_permissions(path, metadata.permissions())
            .map_err(|e| GomodError::io("write gomod", e))?;

        debug!(manifest = %path.display(), bytes = bytes.len(), "wrote sorted manifest");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sorted(text: &str) -> String {
        let mut manifest = Manifest::parse("go.mod", text.as_bytes()).unwrap();
        ManifestSorter::regroup(&mut manifest);
        String::from_utf8(manifest.format().unwrap()).unwrap()
    }

    fn order(text: &str) -> Vec<(String, bool)> {
        Manifest::parse("go.mod", text.as_bytes())
            .unwrap()
            .requirements()
            .map(|r| (r.path.clone(), r.indirect))
            .collect()
    }

    #[test]
    fn direct_group_comes_first() {
        let out = sorted(
            "module m\n\ngo 1.22\n\nrequire (\n\tmod/x v1.0.0\n\tmod/y v1.0.0 // indirect\n\tmod/z v2.0.0\n)\n",
        );
        assert_eq!(
            out,
            "module m\n\ngo 1.22\n\nrequire (\n\tmod/x v1.0.0\n\tmod/z v2.0.0\n)\n\nrequire mod/y v1.0.0 // indirect\n"
        );
    }

    #[test]
    fn scattered_statements_are_merged_at_the_first_one() {
        let out = sorted(
            "module m\n\nrequire c v1.0.0 // indirect\n\nreplace a => ../a\n\nrequire (\n\tb v1.0.0\n\td v1.0.0 // indirect\n\ta v1.0.0\n)\n",
        );
        assert_eq!(
            out,
            "module m\n\nrequire (\n\tb v1.0.0\n\ta v1.0.0\n)\n\nrequire (\n\tc v1.0.0 // indirect\n\td v1.0.0 // indirect\n)\n\nreplace a => ../a\n"
        );
    }

    #[test]
    fn groups_are_stable_partitions() {
        let input = "require (\n\tq v1.0.0 // indirect\n\tb v1.0.0\n\tp v1.0.0 // indirect\n\ta v1.0.0\n\tz v1.0.0 // indirect\n\tc v1.0.0\n)\n";
        let after = order(&sorted(input));
        let names: Vec<&str> = after.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c", "q", "p", "z"]);

        let first_indirect = after.iter().position(|(_, ind)| *ind).unwrap();
        assert!(after[first_indirect..].iter().all(|(_, ind)| *ind));
    }

    #[test]
    fn sorting_twice_changes_nothing() {
        let inputs = [
            "module m\n\nrequire (\n\ta v1.0.0 // indirect\n\tb v1.0.0\n)\n\n\nrequire c v1.0.0\n",
            "module m\nrequire (\n\t// why\n\ta v1.0.0 // indirect\n\tb v1.0.0 // note\n\t// tail\n)\nexclude x v1.0.0\n",
            "module m\n\nrequire a v1.0.0 // indirect\n",
            "module m\n",
            "module m\n\nrequire ( // pinned\n\ta v1.0.0\n\tb v1.0.0 // indirect\n)\n\nreplace a => ../a\n",
            "// top\nrequire b v1.0.0 // indirect\n// mid\nrequire a v1.0.0\ngo 1.22\n",
        ];
        for input in inputs {
            let once = sorted(input);
            assert_eq!(sorted(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn comments_travel_with_their_requirement() {
        let out = sorted("require (\n\t// pulled in by b\n\ta v1.0.0 // indirect\n\tb v1.0.0\n)\n");
        assert_eq!(
            out,
            "require b v1.0.0\n\n// pulled in by b\nrequire a v1.0.0 // indirect\n"
        );
        assert_eq!(sorted(&out), out);
    }

    #[test]
    fn comments_above_one_line_requires_move_with_them() {
        let out = sorted(
            "module m\n\n// pulled in by the test harness\nrequire b v1.0.0 // indirect\n\nrequire a v1.0.0\n",
        );
        assert_eq!(
            out,
            "module m\n\nrequire a v1.0.0\n\n// pulled in by the test harness\nrequire b v1.0.0 // indirect\n"
        );
    }

    #[test]
    fn comments_join_a_block_when_groups_merge() {
        let out = sorted("// via c\nrequire a v1.0.0 // indirect\nrequire b v1.0.0 // indirect\n");
        assert_eq!(
            out,
            "require (\n\t// via c\n\ta v1.0.0 // indirect\n\tb v1.0.0 // indirect\n)\n"
        );
        assert_eq!(sorted(&out), out);
    }

    #[test]
    fn opening_comment_survives_regrouping() {
        let out = sorted(
            "module m\n\nrequire ( // pinned, see issue 42\n\ta v1.0.0\n\tb v1.0.0 // indirect\n)\n",
        );
        assert_eq!(
            out,
            "module m\n\nrequire ( // pinned, see issue 42\n\ta v1.0.0\n)\n\nrequire b v1.0.0 // indirect\n"
        );
        assert_eq!(sorted(&out), out);
    }

    #[test]
    fn extra_opening_comments_move_to_the_end_of_a_block() {
        let out = sorted("require ( // one\n\ta v1.0.0\n)\n\nrequire ( // two\n\tb v1.0.0\n)\n");
        assert_eq!(out, "require ( // one\n\ta v1.0.0\n\tb v1.0.0\n\t// two\n)\n");
        assert_eq!(sorted(&out), out);
    }

    #[test]
    fn directives_after_the_requires_keep_one_blank_line() {
        let input = "module m\nrequire (\n\t// why\n\ta v1.0.0 // indirect\n\tb v1.0.0 // note\n\t// tail\n)\nexclude x v1.0.0\n";
        let once = sorted(input);
        assert_eq!(
            once,
            "module m\nrequire b v1.0.0 // note\n\nrequire (\n\t// why\n\ta v1.0.0 // indirect\n\t// tail\n)\n\nexclude x v1.0.0\n"
        );
        assert_eq!(sorted(&once), once);
    }

    #[test]
    fn sort_file_rewrites_in_place_and_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("go.mod");
        fs::write(
            &path,
            "module m\n\nrequire (\n\tmod/x v1.0.0\n\tmod/y v1.0.0 // indirect\n\tmod/z v2.0.0\n)\n",
        )
        .unwrap();

        for _ in 0..2 {
            let mut manifest = Manifest::parse("go.mod", &fs::read(&path).unwrap()).unwrap();
            ManifestSorter::sort_file(&path, &mut manifest).unwrap();
        }
        let first = fs::read(&path).unwrap();

        let mut manifest = Manifest::parse("go.mod", &first).unwrap();
        ManifestSorter::sort_file(&path, &mut manifest).unwrap();
        assert_eq!(fs::read(&path).unwrap(), first);

        let paths: Vec<String> = order(&String::from_utf8(first).unwrap())
            .into_iter()
            .map(|(p, _)| p)
            .collect();
        assert_eq!(paths, vec!["mod/x", "mod/z", "mod/y"]);
    }

    #[cfg(unix)]
    #[test]
    fn sort_file_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("go.mod");
        fs::write(&path, "require a v1.0.0 // indirect\nrequire b v1.0.0\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        let mut manifest = Manifest::parse("go.mod", &fs::read(&path).unwrap()).unwrap();
        ManifestSorter::sort_file(&path, &mut manifest).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "require b v1.0.0\n\nrequire a v1.0.0 // indirect\n"
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let mut manifest = Manifest::parse("go.mod", b"require a v1.0.0\n").unwrap();
        let err = ManifestSorter::sort_file(&dir.path().join("go.mod"), &mut manifest).unwrap_err();
        assert!(matches!(err, GomodError::Io(ref m) if m.starts_with("stat gomod")));
    }
}
