use super::types::ChangedFile;

/// Concatenate the patches of the changed files into one review text.
///
/// Each file with a non-empty patch contributes
///   File: {filename}
///   {patch}
/// followed by a blank line. Files without a patch (binary files, or
/// diffs GitHub refused to render) are skipped. Order follows the API
/// response; nothing is truncated.
pub fn build_diff_bundle(files: &[ChangedFile]) -> String {
    let mut bundle = String::new();
    for file in files {
        let Some(patch) = file.patch.as_deref().filter(|p| !p.is_empty()) else {
            continue;
        };
        bundle.push_str("File: ");
        bundle.push_str(&file.filename);
        bundle.push('\n');
        bundle.push_str(patch);
        bundle.push_str("\n\n");
    }
    bundle
}
