//! Tests for the directory-backed asset store and its planning inventory

#[cfg(test)]
mod tests {
    use crate::{drawn_tile, test_config};
    use sheetmerge::io::codec::decode_raster;
    use sheetmerge::sheet::identity::{CharacterId, SheetName};
    use sheetmerge::store::{AssetStore, StoreInventory, assets::list_tiles};
    use std::fs;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> AssetStore {
        AssetStore::from_config(&test_config(dir.path()))
    }

    fn name(stem: &str) -> SheetName {
        SheetName::from_stem(stem).unwrap()
    }

    // Tests the base tile lands in a directory named after the sheet
    // Verified by writing every base into the root directory
    #[test]
    fn test_put_base_layout() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let path = store.put_base(&name("0012_home"), &drawn_tile(1)).unwrap();

        assert_eq!(path, store.base_root().join("0012_home").join("0012_home.png"));
        assert_eq!(decode_raster(&path).unwrap(), drawn_tile(1));
        assert_eq!(store.base_tile(CharacterId::new(12)).unwrap(), Some(path));
        assert_eq!(store.base_tile(CharacterId::new(13)).unwrap(), None);
    }

    // Tests variant tiles are numbered per sheet and a marker is written
    // Verified by omitting the marker for sheets without variants
    #[test]
    fn test_put_variants_numbering_and_marker() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let canonical = name("4");
        let variant_dir = store.variant_dir_for(&canonical);

        let written = store
            .put_variants(&variant_dir, &canonical, &[drawn_tile(1), drawn_tile(2)])
            .unwrap();
        let none = store.put_variants(&variant_dir, &name("4_pool"), &[]).unwrap();

        assert_eq!(
            written,
            vec![variant_dir.join("4_00.png"), variant_dir.join("4_01.png")]
        );
        assert!(none.is_empty());
        assert!(variant_dir.join("4.ingested").is_file());
        assert!(variant_dir.join("4_pool.ingested").is_file());
        assert_eq!(list_tiles(&variant_dir).unwrap(), written);
        assert_eq!(store.variant_tiles(CharacterId::new(4)).unwrap(), written);
    }

    // Tests an empty or missing store yields an empty inventory
    // Verified by failing on missing roots
    #[test]
    fn test_inventory_of_missing_store() {
        let dir = TempDir::new().unwrap();

        let inventory = store(&dir).inventory().unwrap();

        assert_eq!(inventory, StoreInventory::default());
        assert_eq!(inventory.base_sheets().count(), 0);
    }

    // Tests the inventory records bases, variant directories and ingested sheets
    // Verified by recording tile file names instead of sheet stems
    #[test]
    fn test_inventory_contents() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let canonical = name("7_a");
        let variant_dir = store.variant_dir_for(&canonical);
        store.put_base(&canonical, &drawn_tile(1)).unwrap();
        store
            .put_variants(&variant_dir, &canonical, &[drawn_tile(2)])
            .unwrap();
        store
            .put_variants(&variant_dir, &name("7_b"), &[drawn_tile(3)])
            .unwrap();

        let inventory = store.inventory().unwrap();

        assert!(inventory.is_known_base("7_a"));
        assert!(!inventory.is_known_base("7_b"));
        assert!(inventory.is_known_variant("7_a"));
        assert!(inventory.is_known_variant("7_b"));
        assert!(!inventory.is_known_variant("7_a_00"));
        assert_eq!(
            inventory.variant_dir(CharacterId::new(7)),
            Some(variant_dir.as_path())
        );
        assert!(inventory.has_ingested(&variant_dir, "7_b"));
        assert!(!inventory.has_ingested(&variant_dir, "7_c"));
        assert_eq!(inventory.base_sheet(CharacterId::new(7)), Some(&canonical));
        assert_eq!(inventory.base_sheets().count(), 1);
    }

    // Tests directories without a character number are ignored
    // Verified by failing the whole inventory on a stray directory
    #[test]
    fn test_stray_directories_ignored() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.variant_root().join("notes")).unwrap();
        fs::create_dir_all(store.base_root().join("misc")).unwrap();

        let inventory = store.inventory().unwrap();
        assert_eq!(inventory.base_sheets().count(), 0);
        assert!(store.all_variants().unwrap().is_empty());
        assert!(store.all_bases().unwrap().is_empty());
    }

    // Tests bulk listings follow sorted directory order and skip markers
    // Verified by listing marker files as tiles
    #[test]
    fn test_all_bases_and_variants() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        for stem in ["2", "10", "1"] {
            let sheet = name(stem);
            store.put_base(&sheet, &drawn_tile(1)).unwrap();
            store
                .put_variants(&store.variant_dir_for(&sheet), &sheet, &[drawn_tile(2)])
                .unwrap();
        }

        let bases: Vec<u64> = store
            .all_bases()
            .unwrap()
            .into_iter()
            .map(|(id, _)| id.value())
            .collect();
        assert_eq!(bases, vec![1, 10, 2]);

        let variants = store.all_variants().unwrap();
        assert_eq!(variants.len(), 3);
        assert!(variants.iter().all(|character| character.tiles.len() == 1));
        assert_eq!(variants[1].id, CharacterId::new(10));
    }
}
