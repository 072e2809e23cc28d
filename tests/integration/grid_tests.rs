//! Grid partitioning integration tests.
//!
//! Sweeps small image and tile sizes and checks every grid pixel by pixel.

use ktx_tiler::tile::{grid_dimensions, partition, TileFormat};

#[test]
fn test_every_pixel_covered_exactly_once() {
    for width in 1..=20u32 {
        for height in 1..=20u32 {
            for tile_size in 1..=22u32 {
                let regions = partition(width, height, tile_size).unwrap();
                let (columns, rows) = grid_dimensions(width, height, tile_size).unwrap();

                assert_eq!(regions.len(), (columns * rows) as usize);
                assert_eq!(columns, width.div_ceil(tile_size));
                assert_eq!(rows, height.div_ceil(tile_size));

                let mut coverage = vec![0u8; (width * height) as usize];
                for region in &regions {
                    assert!(region.width >= 1 && region.width <= tile_size);
                    assert!(region.height >= 1 && region.height <= tile_size);
                    assert!(region.fits_within(width, height));

                    for y in u64::from(region.y)..region.bottom() {
                        for x in u64::from(region.x)..region.right() {
                            coverage[(y * u64::from(width) + x) as usize] += 1;
                        }
                    }
                }

                assert!(
                    coverage.iter().all(|&count| count == 1),
                    "bad coverage for {}x{} @ {}",
                    width,
                    height,
                    tile_size
                );
            }
        }
    }
}

#[test]
fn test_ids_unique_and_row_major() {
    let regions = partition(70, 45, 16).unwrap();

    let mut ids: Vec<String> = regions.iter().map(|r| r.id()).collect();
    assert_eq!(ids[0], "0_0");
    assert_eq!(ids[4], "4_0");
    assert_eq!(ids[5], "0_1");
    assert_eq!(regions.last().unwrap().file_name(TileFormat::Ktx2), "4_2.ktx2");

    let expected: Vec<(u32, u32)> = (0..3)
        .flat_map(|row| (0..5).map(move |col| (col, row)))
        .collect();
    let actual: Vec<(u32, u32)> = regions.iter().map(|r| (r.col, r.row)).collect();
    assert_eq!(actual, expected);

    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), regions.len());
}

#[test]
fn test_large_image_grid_is_cheap() {
    let regions = partition(65_536, 32_768, 1024).unwrap();

    assert_eq!(regions.len(), 64 * 32);
    let total_area: u64 = regions.iter().map(|r| r.area()).sum();
    assert_eq!(total_area, 65_536u64 * 32_768);
}
