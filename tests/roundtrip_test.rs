use std::fs::{self, File};
use std::path::Path;
use tempfile::TempDir;

use qrpack::{chunk_count, ArchiveFormat, Error, UNIT};

fn pseudo_random(len: usize) -> Vec<u8> {
    let mut x: u64 = 12345;
    (0..len)
        .map(|_| {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            (x >> 56) as u8
        })
        .collect()
}

fn base64_len(bytes: usize) -> usize {
    bytes.div_ceil(3) * 4
}

#[test]
#[cfg(all(feature = "encode", feature = "decode"))]
fn test_notes_roundtrip() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let source_file_path = temp_dir.path().join("notes.txt");
    let qr_output_dir = temp_dir.path().join("qr");
    let restored_dir = temp_dir.path().join("restored");

    let original = pseudo_random(4500);
    fs::write(&source_file_path, &original).expect("Failed to write source file");

    let encode_result = qrpack::encode_path(&source_file_path, ArchiveFormat::Xz, &qr_output_dir)
        .expect("Encoding failed");

    assert_eq!(encode_result.archive_name, "notes.txt.tar.xz");
    // Incompressible input: the archive is larger than 4500 bytes.
    assert!(encode_result.num_chunks >= 4);
    for (i, path) in encode_result.output_files.iter().enumerate() {
        assert_eq!(path, &qr_output_dir.join(format!("notes.txt.tar.xz.{i}.png")));
        assert!(path.is_file());
    }
    assert_eq!(
        fs::read_dir(&qr_output_dir).unwrap().count(),
        encode_result.num_chunks
    );

    let decode_result = qrpack::decode_series(
        &qr_output_dir.join("notes.txt.tar.xz.0.png"),
        Some(&restored_dir),
    )
    .expect("Decoding failed");

    assert_eq!(decode_result.num_chunks, encode_result.num_chunks);
    assert_eq!(decode_result.output_path, restored_dir.join("notes.txt.tar.xz"));

    let archive_len = fs::metadata(&decode_result.output_path).unwrap().len() as usize;
    assert_eq!(
        chunk_count(base64_len(archive_len), UNIT),
        encode_result.num_chunks
    );

    let unpacked = temp_dir.path().join("unpacked");
    let archive = File::open(&decode_result.output_path).unwrap();
    tar::Archive::new(xz2::read::XzDecoder::new(archive))
        .unpack(&unpacked)
        .expect("Restored archive is not a valid tar.xz");
    assert_eq!(fs::read(unpacked.join("notes.txt")).unwrap(), original);
}

#[test]
#[cfg(all(feature = "encode", feature = "decode"))]
fn test_any_member_resolves_series() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let archive = temp_dir.path().join("blob.bin.zip");
    let data = pseudo_random(5000);
    fs::write(&archive, &data).unwrap();

    let qr_output_dir = temp_dir.path().join("qr");
    let encode_result = qrpack::encode_archive(&archive, &qr_output_dir).expect("Encoding failed");
    assert_eq!(encode_result.num_chunks, 4);

    // Starting from the last image, writing next to the images.
    let last = encode_result.output_files.last().unwrap();
    let decode_result = qrpack::decode_series(last, None).expect("Decoding failed");

    assert_eq!(decode_result.output_path, qr_output_dir.join("blob.bin.zip"));
    assert_eq!(fs::read(&decode_result.output_path).unwrap(), data);
}

#[test]
#[cfg(all(feature = "encode", feature = "decode"))]
fn test_exact_multiple_has_trailing_empty_chunk() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    // 1500 bytes -> exactly 2000 Base64 characters.
    let archive = temp_dir.path().join("even.zip");
    let data = pseudo_random(1500);
    fs::write(&archive, &data).unwrap();

    let qr_output_dir = temp_dir.path().join("qr");
    let encode_result = qrpack::encode_archive(&archive, &qr_output_dir).expect("Encoding failed");
    assert_eq!(encode_result.num_chunks, 2);
    assert!(qr_output_dir.join("even.zip.1.png").is_file());

    let restored_dir = temp_dir.path().join("restored");
    let decode_result =
        qrpack::decode_series(&qr_output_dir.join("even.zip.1.png"), Some(&restored_dir))
            .expect("Decoding failed");
    assert_eq!(fs::read(decode_result.output_path).unwrap(), data);
}

#[test]
#[cfg(all(feature = "encode", feature = "decode"))]
fn test_missing_chunk_fails_loudly() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let archive = temp_dir.path().join("gap.zip");
    fs::write(&archive, pseudo_random(4000)).unwrap();

    let qr_output_dir = temp_dir.path().join("qr");
    let encode_result = qrpack::encode_archive(&archive, &qr_output_dir).expect("Encoding failed");
    assert!(encode_result.num_chunks >= 3);

    fs::remove_file(qr_output_dir.join("gap.zip.1.png")).unwrap();

    let restored_dir = temp_dir.path().join("restored");
    match qrpack::decode_series(&qr_output_dir.join("gap.zip.0.png"), Some(&restored_dir)) {
        Err(Error::MissingChunk { index, series }) => {
            assert_eq!(index, 1);
            assert_eq!(series, "gap.zip");
        }
        other => panic!("expected MissingChunk, got {other:?}"),
    }
    assert!(!restored_dir.join("gap.zip").exists());
}

#[test]
#[cfg(all(feature = "encode", feature = "decode"))]
fn test_corrupt_chunk_fails_loudly() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let archive = temp_dir.path().join("bad.zip");
    fs::write(&archive, pseudo_random(4000)).unwrap();

    let qr_output_dir = temp_dir.path().join("qr");
    qrpack::encode_archive(&archive, &qr_output_dir).expect("Encoding failed");

    let blank = image::RgbImage::from_pixel(300, 300, image::Rgb([255u8, 255, 255]));
    blank.save(qr_output_dir.join("bad.zip.1.png")).unwrap();

    let result = qrpack::decode_series(&qr_output_dir.join("bad.zip.0.png"), None);
    assert!(matches!(
        result,
        Err(Error::UndecodableChunk { index: 1, .. })
    ));
}

#[test]
#[cfg(all(feature = "encode", feature = "decode"))]
fn test_directory_zip_roundtrip() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let project = temp_dir.path().join("project");
    fs::create_dir_all(project.join("src")).unwrap();
    fs::write(project.join("README.md"), "# project\n").unwrap();
    fs::write(project.join("src/lib.rs"), "pub fn answer() -> u32 { 42 }\n").unwrap();

    let qr_output_dir = temp_dir.path().join("qr");
    let encode_result =
        qrpack::encode_path(&project, ArchiveFormat::Zip, &qr_output_dir).expect("Encoding failed");
    assert_eq!(encode_result.archive_name, "project.zip");

    let restored_dir = temp_dir.path().join("restored");
    let decode_result = qrpack::decode_series(&encode_result.output_files[0], Some(&restored_dir))
        .expect("Decoding failed");

    let unpacked = temp_dir.path().join("unpacked");
    zip::ZipArchive::new(File::open(&decode_result.output_path).unwrap())
        .unwrap()
        .extract(&unpacked)
        .unwrap();
    assert_eq!(
        fs::read_to_string(unpacked.join("README.md")).unwrap(),
        "# project\n"
    );
    assert_eq!(
        fs::read_to_string(unpacked.join("src/lib.rs")).unwrap(),
        "pub fn answer() -> u32 { 42 }\n"
    );
}

#[test]
#[cfg(feature = "decode")]
fn test_not_a_chunk_series() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let restored_dir = temp_dir.path().join("restored");

    let result = qrpack::decode_series(Path::new("notes.txt"), Some(&restored_dir));
    assert!(matches!(result, Err(Error::NotAChunkSeries(_))));
    assert!(!restored_dir.exists());
}

#[test]
fn test_unsupported_format() {
    assert!(matches!(
        "rar".parse::<ArchiveFormat>(),
        Err(Error::UnsupportedFormat(_))
    ));
}
